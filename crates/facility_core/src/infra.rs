//! PDU load and cable hygiene helpers.

use serde::{Deserialize, Serialize};

use crate::power::cabinet_power_w;
use crate::{CableRun, Cabinet, FacilityContent, Pdu, PduId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PduReport {
    pub pdu_id: PduId,
    pub load_kw: f64,
    pub max_capacity_kw: f64,
    pub overloaded: bool,
}

/// Load in kW from powered cabinets inside the PDU's range.
/// A PDU kind with no def carries no load.
pub fn get_pdu_load(pdu: &Pdu, cabinets: &[Cabinet], content: &FacilityContent) -> f64 {
    let Some(def) = content.pdus.get(&pdu.kind) else {
        tracing::debug!(pdu = %pdu.id, kind = ?pdu.kind, "no PDU def, load treated as zero");
        return 0.0;
    };
    let watts: f64 = cabinets
        .iter()
        .filter(|c| c.powered && c.pos.within(pdu.pos, def.range))
        .map(|c| cabinet_power_w(c, content))
        .sum();
    watts / 1000.0
}

pub fn is_pdu_overloaded(pdu: &Pdu, cabinets: &[Cabinet], content: &FacilityContent) -> bool {
    get_pdu_load(pdu, cabinets, content) > pdu.max_capacity_kw
}

pub fn pdu_reports(
    pdus: &[Pdu],
    cabinets: &[Cabinet],
    content: &FacilityContent,
) -> Vec<PduReport> {
    pdus.iter()
        .map(|pdu| {
            let load_kw = get_pdu_load(pdu, cabinets, content);
            PduReport {
                pdu_id: pdu.id.clone(),
                load_kw,
                max_capacity_kw: pdu.max_capacity_kw,
                overloaded: load_kw > pdu.max_capacity_kw,
            }
        })
        .collect()
}

/// Cable runs left loose on the floor instead of in a tray.
pub fn count_messy_cables(runs: &[CableRun]) -> u32 {
    let messy = runs.iter().filter(|r| !r.in_tray).count();
    u32::try_from(messy).unwrap_or(u32::MAX)
}
