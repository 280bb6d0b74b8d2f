//! Type definitions for `facility_core`.
//!
//! Topology records (owned by the orchestrator, read-only here), the static
//! content tables, and the snapshot handed to `evaluate_facility`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(CabinetId);
string_id!(SpineId);
string_id!(CoolingUnitId);
string_id!(ChillerId);
string_id!(PduId);
string_id!(CableRunId);
string_id!(AisleId);

/// A floor tile. Rows grow southward: row 0 is the northernmost row.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GridPos {
    pub col: i32,
    pub row: i32,
}

// ---------------------------------------------------------------------------
// Closed enumerations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Production,
    Lab,
    Management,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    #[default]
    General,
    AiTraining,
    Streaming,
    Crypto,
    Enterprise,
}

/// Direction the cabinet's front (cold-air intake) points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    #[default]
    North,
    South,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoolingUnitKind {
    FanTray,
    Crac,
    Crah,
    ImmersionPod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChillerTier {
    Basic,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PduKind {
    Basic,
    Metered,
    Smart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteTier {
    Starter,
    Standard,
    Professional,
    Enterprise,
}

// ---------------------------------------------------------------------------
// Topology records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cabinet {
    pub id: CabinetId,
    pub pos: GridPos,
    pub environment: Environment,
    #[serde(default)]
    pub customer_type: CustomerType,
    pub server_count: u32,
    #[serde(default)]
    pub has_leaf_switch: bool,
    pub powered: bool,
    /// Current heat level in °C, maintained by the orchestrator.
    #[serde(default)]
    pub heat_level: f64,
    /// Server age in game days. Carried for the orchestrator's failure model.
    #[serde(default)]
    pub server_age: u32,
    #[serde(default)]
    pub facing: Facing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpineSwitch {
    pub id: SpineId,
    pub powered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoolingUnit {
    pub id: CoolingUnitId,
    pub kind: CoolingUnitKind,
    pub pos: GridPos,
    pub operational: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChillerPlant {
    pub id: ChillerId,
    pub pos: GridPos,
    pub tier: ChillerTier,
    pub operational: bool,
}

/// One tile of chilled-water pipe. Pipes connect when orthogonally adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoolingPipe {
    pub pos: GridPos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pdu {
    pub id: PduId,
    pub pos: GridPos,
    pub kind: PduKind,
    pub max_capacity_kw: f64,
}

/// A leaf-to-spine cable run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CableRun {
    pub id: CableRunId,
    pub cabinet_id: CabinetId,
    pub spine_id: SpineId,
    #[serde(default)]
    pub length_tiles: u32,
    pub in_tray: bool,
}

/// Everything the orchestrator hands the engine for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilitySnapshot {
    pub suite_tier: SuiteTier,
    #[serde(default)]
    pub cabinets: Vec<Cabinet>,
    #[serde(default)]
    pub spines: Vec<SpineSwitch>,
    #[serde(default)]
    pub cooling_units: Vec<CoolingUnit>,
    #[serde(default)]
    pub chillers: Vec<ChillerPlant>,
    #[serde(default)]
    pub pipes: Vec<CoolingPipe>,
    #[serde(default)]
    pub pdus: Vec<Pdu>,
    #[serde(default)]
    pub cable_runs: Vec<CableRun>,
    /// Aisles with installed hot/cold containment.
    #[serde(default)]
    pub containment: Vec<AisleId>,
    /// Time-of-day traffic demand scaling. 1.0 is baseline.
    #[serde(default = "default_demand_multiplier")]
    pub demand_multiplier: f64,
    /// Tech-unlocked fabric: links use `high_bandwidth_link_capacity_gbps`.
    #[serde(default)]
    pub high_bandwidth_fabric: bool,
}

fn default_demand_multiplier() -> f64 {
    1.0
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoolingUnitDef {
    pub cooling_rate: f64,
    /// Manhattan reach in tiles.
    pub range: u32,
    /// Cabinets served at full efficiency before output is shared.
    pub max_cabinets: u32,
    /// Water-side units depend on a chiller loop.
    #[serde(default)]
    pub chilled_water: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChillerDef {
    pub range: u32,
    pub efficiency_bonus: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PduDef {
    pub range: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneBonus {
    /// Fractional revenue bonus (0.10 = +10%).
    pub revenue: f64,
    /// Heat reduction in °C applied to member cabinets.
    #[serde(default)]
    pub heat_reduction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomerDef {
    pub power_multiplier: f64,
    pub bandwidth_multiplier: f64,
    /// `None` means this customer type never forms a customer zone.
    #[serde(default)]
    pub zone_bonus: Option<ZoneBonus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentDef {
    pub zone_bonus: ZoneBonus,
}

/// The gap between two cabinet rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AisleDef {
    pub id: AisleId,
    pub upper_row: i32,
    pub lower_row: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteLayout {
    /// Cabinet slots per row.
    pub columns: u32,
    pub cabinet_rows: Vec<i32>,
    #[serde(default)]
    pub aisles: Vec<AisleDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    /// Average heat reported when nothing is powered (°C).
    pub ambient_heat: f64,
    pub server_power_w: f64,
    pub leaf_switch_power_w: f64,
    pub spine_switch_power_w: f64,
    pub management_bonus_per_server: f64,
    pub management_bonus_cap: f64,
    pub gbps_per_server: f64,
    pub link_capacity_gbps: f64,
    pub high_bandwidth_link_capacity_gbps: f64,
    /// Passive dissipation every cabinet gets before any cooling unit.
    pub ambient_cooling_rate: f64,
    /// Multiplier for a water-side unit cut off from every chiller.
    pub chiller_unconnected_penalty: f64,
    pub zone_min_size: u32,
    pub aisle_pair_bonus: f64,
    pub aisle_bonus_max: f64,
    pub containment_bonus: f64,
    pub containment_bonus_max: f64,
    pub adjacency_heat_penalty: f64,
    pub trapped_air_penalty: f64,
    pub front_clearance_cooling: f64,
    pub rear_clearance_cooling: f64,
    /// Revenue penalty applied by the orchestrator to isolated cabinets.
    pub mixed_env_penalty: f64,
    pub dedicated_row_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityContent {
    pub content_version: String,
    pub constants: Constants,
    pub cooling_units: BTreeMap<CoolingUnitKind, CoolingUnitDef>,
    pub chillers: BTreeMap<ChillerTier, ChillerDef>,
    pub pdus: BTreeMap<PduKind, PduDef>,
    pub customers: BTreeMap<CustomerType, CustomerDef>,
    pub environments: BTreeMap<Environment, EnvironmentDef>,
    pub suite_layouts: BTreeMap<SuiteTier, SuiteLayout>,
}
