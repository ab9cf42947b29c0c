use crate::config::EntropyConfig;
use crate::pipeline::PlayerRow;

/// Substituted for an undefined type entropy.
pub const NEUTRAL_TYPE_ENTROPY: f64 = 0.5;

/// Share of a player's xG that comes from a concentrated, close-range pattern.
///
/// Each entropy is inverted so low dispersion raises the score, and box-shot
/// share counts directly. The weighted sum is clamped to `[0, 1]` whatever the
/// configured weights add up to.
pub fn stability_score(row: &PlayerRow, cfg: &EntropyConfig) -> f64 {
    let type_entropy = row.type_entropy.unwrap_or(NEUTRAL_TYPE_ENTROPY);
    let box_share = if row.box_shot_share.is_nan() { 0.0 } else { row.box_shot_share };
    let raw = cfg.w_shot_entropy * (1.0 - row.shot_entropy)
        + cfg.w_spatial_entropy * (1.0 - row.spatial_entropy)
        + cfg.w_type_entropy * (1.0 - type_entropy)
        + cfg.w_box_share * box_share;
    if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) }
}

pub fn apply_stability(rows: &mut [PlayerRow], cfg: &EntropyConfig) {
    for row in rows {
        let stability = stability_score(row, cfg);
        row.stability = stability;
        row.xg_adj = row.xg * stability;
        // Per-player stability as a percentage, not a share of the league total.
        row.xg_adj_pct = 100.0 * stability;
    }
}

/// Orders players by adjusted xG, then raw xG, and numbers them from 1.
///
/// The sort is stable: players tied on both keys keep their incoming order
/// and still get distinct consecutive ranks.
pub fn rank_players(mut rows: Vec<PlayerRow>) -> Vec<PlayerRow> {
    rows.sort_by(|a, b| b.xg_adj.total_cmp(&a.xg_adj).then(b.xg.total_cmp(&a.xg)));
    for (idx, row) in rows.iter_mut().enumerate() {
        row.rank = Some(u32::try_from(idx + 1).unwrap_or(u32::MAX));
    }
    rows
}

pub fn filter_min_shots(rows: &[PlayerRow], min_shots: usize) -> Vec<PlayerRow> {
    rows.iter().filter(|r| r.shots >= min_shots).cloned().collect()
}
