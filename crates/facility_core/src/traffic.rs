//! Leaf-spine traffic distribution.
//!
//! Each powered leaf splits its demand evenly across the active spines
//! (an ECMP approximation). A link carries at most its capacity; demand above
//! that is dropped, not shifted onto other spines. Any unpowered spine flags
//! every live link as redirected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{round_to, Cabinet, CabinetId, CustomerType, FacilityContent, SpineId, SpineSwitch};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficLink {
    pub leaf: CabinetId,
    pub spine: SpineId,
    pub bandwidth_gbps: f64,
    pub capacity_gbps: f64,
    /// `bandwidth / capacity`, always in `[0, 1]`.
    pub utilization: f64,
    pub redirected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficStats {
    pub links: Vec<TrafficLink>,
    pub total_flows: u32,
    pub total_bandwidth_gbps: f64,
    pub total_capacity_gbps: f64,
    pub redirected_flows: u32,
    /// Load over capacity per configured spine, three decimals.
    pub spine_utilization: BTreeMap<SpineId, f64>,
}

/// Bandwidth multiplier for a customer type. Unknown types use baseline.
pub fn customer_bandwidth_multiplier(customer: CustomerType, content: &FacilityContent) -> f64 {
    if let Some(def) = content.customers.get(&customer) {
        def.bandwidth_multiplier
    } else {
        tracing::debug!(?customer, "no customer def, using baseline bandwidth");
        1.0
    }
}

/// Gbps a cabinet's leaf switch pushes into the fabric.
pub fn cabinet_demand_gbps(
    cabinet: &Cabinet,
    content: &FacilityContent,
    demand_multiplier: f64,
) -> f64 {
    let demand = f64::from(cabinet.server_count)
        * content.constants.gbps_per_server
        * demand_multiplier
        * customer_bandwidth_multiplier(cabinet.customer_type, content);
    demand.max(0.0)
}

/// Traffic over the standard fabric (`link_capacity_gbps` per link).
pub fn calc_traffic(
    cabinets: &[Cabinet],
    spines: &[SpineSwitch],
    content: &FacilityContent,
    demand_multiplier: f64,
) -> TrafficStats {
    calc_traffic_with_capacity(
        cabinets,
        spines,
        content,
        demand_multiplier,
        content.constants.link_capacity_gbps,
    )
}

/// Traffic with an explicit per-link capacity, e.g. for an upgraded fabric.
pub fn calc_traffic_with_capacity(
    cabinets: &[Cabinet],
    spines: &[SpineSwitch],
    content: &FacilityContent,
    demand_multiplier: f64,
    link_capacity_gbps: f64,
) -> TrafficStats {
    let active_spines: Vec<&SpineSwitch> = spines.iter().filter(|s| s.powered).collect();
    let leaves: Vec<&Cabinet> = cabinets
        .iter()
        .filter(|c| c.powered && c.has_leaf_switch)
        .collect();
    if active_spines.is_empty() || leaves.is_empty() {
        return TrafficStats::default();
    }

    let capacity = link_capacity_gbps.max(0.0);
    // Facility-wide signal: one spine down marks every live link.
    let redirected = spines.iter().any(|s| !s.powered);

    let mut links = Vec::with_capacity(leaves.len() * active_spines.len());
    for leaf in &leaves {
        let per_spine =
            cabinet_demand_gbps(leaf, content, demand_multiplier) / active_spines.len() as f64;
        for spine in &active_spines {
            let bandwidth = per_spine.min(capacity);
            let utilization = if capacity > 0.0 {
                (bandwidth / capacity).clamp(0.0, 1.0)
            } else {
                0.0
            };
            links.push(TrafficLink {
                leaf: leaf.id.clone(),
                spine: spine.id.clone(),
                bandwidth_gbps: bandwidth,
                capacity_gbps: capacity,
                utilization,
                redirected,
            });
        }
    }

    let mut spine_totals: BTreeMap<&SpineId, (f64, f64)> = BTreeMap::new();
    for link in &links {
        let entry = spine_totals.entry(&link.spine).or_insert((0.0, 0.0));
        entry.0 += link.bandwidth_gbps;
        entry.1 += link.capacity_gbps;
    }
    let spine_utilization = spines
        .iter()
        .map(|spine| {
            let (load, cap) = spine_totals.get(&spine.id).copied().unwrap_or_default();
            let utilization = if cap > 0.0 { round_to(load / cap, 3) } else { 0.0 };
            (spine.id.clone(), utilization)
        })
        .collect();

    let total_flows = u32::try_from(links.len()).unwrap_or(u32::MAX);
    let redirected_flows = if redirected { total_flows } else { 0 };
    TrafficStats {
        total_bandwidth_gbps: links.iter().map(|l| l.bandwidth_gbps).sum(),
        total_capacity_gbps: links.iter().map(|l| l.capacity_gbps).sum(),
        total_flows,
        redirected_flows,
        spine_utilization,
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, leaf_cabinet, spine};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn no_active_spine_yields_empty_stats() {
        let content = base_content();
        let cabinets = vec![leaf_cabinet("c1", 0, 0, 4)];
        let stats = calc_traffic(&cabinets, &[spine("s1", false)], &content, 1.0);
        assert_eq!(stats, TrafficStats::default());
    }

    #[test]
    fn no_leaf_yields_empty_stats() {
        let content = base_content();
        let mut c = leaf_cabinet("c1", 0, 0, 4);
        c.has_leaf_switch = false;
        let stats = calc_traffic(&[c], &[spine("s1", true)], &content, 1.0);
        assert_eq!(stats.total_flows, 0);
        assert!(stats.links.is_empty());
    }

    #[test]
    fn unpowered_leaf_cabinet_does_not_participate() {
        let content = base_content();
        let mut c = leaf_cabinet("c1", 0, 0, 4);
        c.powered = false;
        let stats = calc_traffic(&[c], &[spine("s1", true)], &content, 1.0);
        assert!(stats.links.is_empty());
    }

    #[test]
    fn demand_splits_evenly_across_active_spines() {
        let content = base_content();
        let cabinets = vec![leaf_cabinet("c1", 0, 0, 8)];
        let spines = vec![spine("s1", true), spine("s2", true)];
        let stats = calc_traffic(&cabinets, &spines, &content, 1.0);
        assert_eq!(stats.total_flows, 2);
        for link in &stats.links {
            assert!(approx(link.bandwidth_gbps, 4.0));
            assert!(approx(link.utilization, 0.4));
            assert!(!link.redirected);
        }
        assert!(approx(stats.total_bandwidth_gbps, 8.0));
        assert!(approx(stats.total_capacity_gbps, 20.0));
        assert_eq!(stats.redirected_flows, 0);
        assert!(approx(stats.spine_utilization[&SpineId("s1".to_string())], 0.4));
    }

    #[test]
    fn overflow_is_capped_not_redistributed() {
        let content = base_content();
        // 30 Gbps over 2 spines = 15 per link, capped at 10.
        let cabinets = vec![leaf_cabinet("c1", 0, 0, 30)];
        let spines = vec![spine("s1", true), spine("s2", true)];
        let stats = calc_traffic(&cabinets, &spines, &content, 1.0);
        for link in &stats.links {
            assert!(approx(link.bandwidth_gbps, 10.0));
            assert!(approx(link.utilization, 1.0));
        }
        assert!(approx(stats.total_bandwidth_gbps, 20.0));
    }

    #[test]
    fn one_spine_down_redirects_every_link() {
        let content = base_content();
        let cabinets = vec![leaf_cabinet("c1", 0, 0, 4), leaf_cabinet("c2", 1, 0, 6)];
        let spines = vec![spine("s1", true), spine("s2", false)];
        let stats = calc_traffic(&cabinets, &spines, &content, 1.0);
        assert_eq!(stats.total_flows, 2);
        assert!(stats.links.iter().all(|l| l.redirected));
        assert_eq!(stats.redirected_flows, 2);
        // The surviving spine carries the full demand.
        assert!(stats.links.iter().all(|l| l.spine.0 == "s1"));
        assert!(approx(stats.spine_utilization[&SpineId("s2".to_string())], 0.0));
    }

    #[test]
    fn spine_utilization_rounds_to_three_decimals() {
        let content = base_content();
        // 1 Gbps over 3 spines = 0.3333.. per link.
        let cabinets = vec![leaf_cabinet("c1", 0, 0, 1)];
        let spines = vec![spine("s1", true), spine("s2", true), spine("s3", true)];
        let stats = calc_traffic(&cabinets, &spines, &content, 1.0);
        assert!(approx(stats.spine_utilization[&SpineId("s3".to_string())], 0.033));
    }

    #[test]
    fn customer_and_demand_multipliers_scale_bandwidth() {
        let content = base_content();
        let mut c = leaf_cabinet("c1", 0, 0, 2);
        c.customer_type = CustomerType::Streaming;
        let stats = calc_traffic(&[c], &[spine("s1", true)], &content, 0.5);
        // 2 servers × 1 Gbps × 0.5 × 3.0 streaming
        assert!(approx(stats.links[0].bandwidth_gbps, 3.0));
    }

    #[test]
    fn high_capacity_variant_raises_link_ceiling() {
        let content = base_content();
        let cabinets = vec![leaf_cabinet("c1", 0, 0, 30)];
        let spines = vec![spine("s1", true)];
        let standard = calc_traffic(&cabinets, &spines, &content, 1.0);
        let upgraded = calc_traffic_with_capacity(&cabinets, &spines, &content, 1.0, 40.0);
        assert!(approx(standard.links[0].bandwidth_gbps, 10.0));
        assert!(approx(upgraded.links[0].bandwidth_gbps, 30.0));
        assert!(approx(upgraded.links[0].utilization, 0.75));
    }

    #[test]
    fn zero_capacity_never_divides_by_zero() {
        let content = base_content();
        let cabinets = vec![leaf_cabinet("c1", 0, 0, 4)];
        let stats = calc_traffic_with_capacity(&cabinets, &[spine("s1", true)], &content, 1.0, 0.0);
        assert!(approx(stats.links[0].utilization, 0.0));
        assert!(approx(stats.spine_utilization[&SpineId("s1".to_string())], 0.0));
    }
}
