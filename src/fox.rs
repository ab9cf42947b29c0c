use crate::config::FoxInBoxConfig;
use crate::pipeline::PlayerRow;

/// Poacher profile: tight shot map, mostly inside the box, good chances, enough volume.
///
/// Every condition must hold. Comparisons against NaN are false, so a missing
/// operand fails its condition rather than raising.
pub fn is_fox_in_box(row: &PlayerRow, cfg: &FoxInBoxConfig) -> bool {
    row.spatial_entropy <= cfg.max_spatial_entropy
        && row.box_shot_share >= cfg.min_box_share
        && row.xg_per_shot >= cfg.min_xg_per_shot
        && row.shots >= cfg.min_shots
}

pub fn add_fox_in_box_flag(mut rows: Vec<PlayerRow>, cfg: &FoxInBoxConfig) -> Vec<PlayerRow> {
    for row in &mut rows {
        row.fox_in_box_flag = Some(is_fox_in_box(row, cfg));
    }
    rows
}
