//! Facility power and thermal aggregation.
//!
//! IT load comes from powered cabinets (servers plus leaf switch) and powered
//! spine switches. Cooling overhead is a banded function of average cabinet
//! heat, discounted by powered management servers.

use serde::{Deserialize, Serialize};

use crate::{round_to, Cabinet, Constants, CustomerType, Environment, FacilityContent, SpineSwitch};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityStats {
    /// IT load in Watts.
    pub total_power_w: f64,
    pub cooling_power_w: f64,
    /// Mean heat of powered cabinets in °C, rounded to a whole degree.
    pub avg_heat: f64,
    /// 0.0 when there is no IT load.
    pub pue: f64,
    /// Fractional cooling-overhead reduction in `[0, management_bonus_cap]`.
    pub mgmt_bonus: f64,
}

/// Power multiplier for a customer type. Unknown types draw at baseline.
pub fn customer_power_multiplier(customer: CustomerType, content: &FacilityContent) -> f64 {
    if let Some(def) = content.customers.get(&customer) {
        def.power_multiplier
    } else {
        tracing::debug!(?customer, "no customer def, using baseline power draw");
        1.0
    }
}

/// Power draw of one cabinet in Watts. Unpowered cabinets draw nothing.
pub fn cabinet_power_w(cabinet: &Cabinet, content: &FacilityContent) -> f64 {
    if !cabinet.powered {
        return 0.0;
    }
    let c = &content.constants;
    let servers = f64::from(cabinet.server_count)
        * c.server_power_w
        * customer_power_multiplier(cabinet.customer_type, content);
    let leaf = if cabinet.has_leaf_switch {
        c.leaf_switch_power_w
    } else {
        0.0
    };
    (servers + leaf).max(0.0)
}

/// Cooling overhead as a fraction of IT load for a given average heat.
///
/// Flat bands up to 80°C, then a linear climb past the critical band.
pub fn cooling_overhead(avg_heat: f64) -> f64 {
    if avg_heat <= 30.0 {
        0.15
    } else if avg_heat <= 40.0 {
        0.20
    } else if avg_heat <= 50.0 {
        0.30
    } else if avg_heat <= 60.0 {
        0.45
    } else if avg_heat <= 70.0 {
        0.65
    } else if avg_heat <= 80.0 {
        0.90
    } else {
        1.2 + 0.05 * (avg_heat - 80.0)
    }
}

/// Cooling-overhead reduction from powered management servers, capped.
pub fn management_bonus(cabinets: &[Cabinet], constants: &Constants) -> f64 {
    let servers: u32 = cabinets
        .iter()
        .filter(|c| c.powered && c.environment == Environment::Management)
        .map(|c| c.server_count)
        .sum();
    (f64::from(servers) * constants.management_bonus_per_server)
        .clamp(0.0, constants.management_bonus_cap.max(0.0))
}

pub fn calc_stats(
    cabinets: &[Cabinet],
    spines: &[SpineSwitch],
    content: &FacilityContent,
) -> FacilityStats {
    let c = &content.constants;

    let mut it_power = 0.0;
    let mut heat_sum = 0.0;
    let mut powered_count = 0u32;
    for cabinet in cabinets.iter().filter(|c| c.powered) {
        it_power += cabinet_power_w(cabinet, content);
        heat_sum += cabinet.heat_level.max(0.0);
        powered_count += 1;
    }
    let avg_heat = if powered_count == 0 {
        c.ambient_heat
    } else {
        (heat_sum / f64::from(powered_count)).round()
    };

    let powered_spines = spines.iter().filter(|s| s.powered).count();
    it_power += powered_spines as f64 * c.spine_switch_power_w;

    let mgmt_bonus = management_bonus(cabinets, c);
    let cooling_power =
        (it_power * cooling_overhead(avg_heat) * (1.0 - mgmt_bonus).max(0.0)).round();
    let pue = if it_power > 0.0 {
        round_to((it_power + cooling_power) / it_power, 2)
    } else {
        0.0
    };

    FacilityStats {
        total_power_w: it_power,
        cooling_power_w: cooling_power,
        avg_heat,
        pue,
        mgmt_bonus,
    }
}
