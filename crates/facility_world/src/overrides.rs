use anyhow::{bail, Result};
use facility_core::Constants;
use std::collections::HashMap;

pub const VALID_KEYS: &[&str] = &[
    "ambient_heat",
    "server_power_w",
    "leaf_switch_power_w",
    "spine_switch_power_w",
    "management_bonus_per_server",
    "management_bonus_cap",
    "gbps_per_server",
    "link_capacity_gbps",
    "high_bandwidth_link_capacity_gbps",
    "ambient_cooling_rate",
    "chiller_unconnected_penalty",
    "zone_min_size",
    "aisle_pair_bonus",
    "aisle_bonus_max",
    "containment_bonus",
    "containment_bonus_max",
    "adjacency_heat_penalty",
    "trapped_air_penalty",
    "front_clearance_cooling",
    "rear_clearance_cooling",
    "mixed_env_penalty",
    "dedicated_row_bonus",
];

pub fn apply_overrides(
    constants: &mut Constants,
    overrides: &HashMap<String, serde_json::Value>,
) -> Result<()> {
    for (key, value) in overrides {
        if key == "zone_min_size" {
            constants.zone_min_size = as_u32(key, value)?;
            continue;
        }
        let Some(field) = f64_field(constants, key) else {
            bail!(
                "unknown override key '{key}'. Valid keys: {}",
                VALID_KEYS.join(", ")
            );
        };
        *field = as_f64(key, value)?;
    }
    Ok(())
}

fn f64_field<'a>(c: &'a mut Constants, key: &str) -> Option<&'a mut f64> {
    let field = match key {
        "ambient_heat" => &mut c.ambient_heat,
        "server_power_w" => &mut c.server_power_w,
        "leaf_switch_power_w" => &mut c.leaf_switch_power_w,
        "spine_switch_power_w" => &mut c.spine_switch_power_w,
        "management_bonus_per_server" => &mut c.management_bonus_per_server,
        "management_bonus_cap" => &mut c.management_bonus_cap,
        "gbps_per_server" => &mut c.gbps_per_server,
        "link_capacity_gbps" => &mut c.link_capacity_gbps,
        "high_bandwidth_link_capacity_gbps" => &mut c.high_bandwidth_link_capacity_gbps,
        "ambient_cooling_rate" => &mut c.ambient_cooling_rate,
        "chiller_unconnected_penalty" => &mut c.chiller_unconnected_penalty,
        "aisle_pair_bonus" => &mut c.aisle_pair_bonus,
        "aisle_bonus_max" => &mut c.aisle_bonus_max,
        "containment_bonus" => &mut c.containment_bonus,
        "containment_bonus_max" => &mut c.containment_bonus_max,
        "adjacency_heat_penalty" => &mut c.adjacency_heat_penalty,
        "trapped_air_penalty" => &mut c.trapped_air_penalty,
        "front_clearance_cooling" => &mut c.front_clearance_cooling,
        "rear_clearance_cooling" => &mut c.rear_clearance_cooling,
        "mixed_env_penalty" => &mut c.mixed_env_penalty,
        "dedicated_row_bonus" => &mut c.dedicated_row_bonus,
        _ => return None,
    };
    Some(field)
}

fn as_f64(key: &str, value: &serde_json::Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| anyhow::anyhow!("override '{key}': expected a number, got {value}"))
}

fn as_u32(key: &str, value: &serde_json::Value) -> Result<u32> {
    let val = value.as_u64().ok_or_else(|| {
        anyhow::anyhow!("override '{key}': expected a positive integer, got {value}")
    })?;
    u32::try_from(val)
        .map_err(|_| anyhow::anyhow!("override '{key}': value {val} exceeds u32 range"))
}
