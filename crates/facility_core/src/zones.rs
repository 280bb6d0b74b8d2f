//! Zone detection by flood-fill over orthogonally adjacent cabinets.
//!
//! Pass one groups every cabinet by environment. Pass two regroups only the
//! production cabinets by customer type; those zones stack on top of the
//! environment zone they sit in.

use std::collections::VecDeque;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::grid::TileIndex;
use crate::{Cabinet, CabinetId, CustomerType, Environment, FacilityContent, GridPos, ZoneBonus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Environment,
    Customer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKey {
    Environment(Environment),
    Customer(CustomerType),
}

impl ZoneKey {
    pub fn kind(self) -> ZoneKind {
        match self {
            ZoneKey::Environment(_) => ZoneKind::Environment,
            ZoneKey::Customer(_) => ZoneKind::Customer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub key: ZoneKey,
    /// Members in discovery order.
    pub cabinet_ids: Vec<CabinetId>,
    pub tiles: Vec<GridPos>,
    pub bonus: ZoneBonus,
}

impl Zone {
    pub fn kind(&self) -> ZoneKind {
        self.key.kind()
    }

    pub fn size(&self) -> usize {
        self.cabinet_ids.len()
    }
}

pub fn calc_zones(cabinets: &[Cabinet], content: &FacilityContent) -> Vec<Zone> {
    let min_size = content.constants.zone_min_size.max(1) as usize;
    let index = TileIndex::build(cabinets.iter().map(|c| c.pos));
    let mut zones = Vec::new();

    for members in clusters(cabinets, &index, |c| Some(c.environment)) {
        let environment = cabinets[members[0]].environment;
        if members.len() < min_size {
            continue;
        }
        let Some(def) = content.environments.get(&environment) else {
            tracing::debug!(?environment, "no environment def, no zone");
            continue;
        };
        zones.push(zone(
            cabinets,
            &members,
            ZoneKey::Environment(environment),
            def.zone_bonus,
        ));
    }

    let production_customer =
        |c: &Cabinet| (c.environment == Environment::Production).then_some(c.customer_type);
    for members in clusters(cabinets, &index, production_customer) {
        let customer = cabinets[members[0]].customer_type;
        if members.len() < min_size {
            continue;
        }
        let Some(bonus) = content.customers.get(&customer).and_then(|d| d.zone_bonus) else {
            continue;
        };
        zones.push(zone(cabinets, &members, ZoneKey::Customer(customer), bonus));
    }

    zones
}

fn zone(cabinets: &[Cabinet], members: &[usize], key: ZoneKey, bonus: ZoneBonus) -> Zone {
    Zone {
        key,
        cabinet_ids: members.iter().map(|&i| cabinets[i].id.clone()).collect(),
        tiles: members.iter().map(|&i| cabinets[i].pos).collect(),
        bonus,
    }
}

/// Connected components of cabinets sharing the same key. Cabinets whose key
/// is `None` never join a cluster.
fn clusters<K: PartialEq>(
    cabinets: &[Cabinet],
    index: &TileIndex,
    key_of: impl Fn(&Cabinet) -> Option<K>,
) -> Vec<Vec<usize>> {
    let mut visited: AHashSet<u64> = AHashSet::new();
    let mut out = Vec::new();

    for (seed, cabinet) in cabinets.iter().enumerate() {
        let Some(key) = key_of(cabinet) else {
            continue;
        };
        if !visited.insert(cabinet.pos.packed()) {
            continue;
        }
        let mut members = vec![seed];
        let mut queue = VecDeque::from([seed]);
        while let Some(current) = queue.pop_front() {
            for neighbor in index.neighbors(cabinets[current].pos) {
                let candidate = &cabinets[neighbor];
                if key_of(candidate).as_ref() != Some(&key) {
                    continue;
                }
                if visited.insert(candidate.pos.packed()) {
                    members.push(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }
        out.push(members);
    }
    out
}
