use super::types::BRIDGE_COMMUNITY;

/// Community palette, indexed by community id modulo its length.
pub const PALETTE: &[&str] = &[
	"#3cb44b", "#ffd700", "#4363d8", "#f58231", "#911eb4", "#42d4f4", "#f032e6", "#bfef45",
	"#fabed4", "#469990", "#dcbeff", "#9a6324",
];

pub const BRIDGE_COLOR: &str = "#a0aec0";
pub const DISRUPTED_COLOR: &str = "#e53e3e";
pub const STRANDED_ROUTE_COLOR: &str = "#f6ad55";
pub const STRANDED_AIRPORT_COLOR: &str = "#ed8936";

pub fn community_color(community: i64) -> &'static str {
	if community == BRIDGE_COMMUNITY {
		return BRIDGE_COLOR;
	}
	PALETTE[community.rem_euclid(PALETTE.len() as i64) as usize]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bridge_is_grey() {
		assert_eq!(community_color(-1), BRIDGE_COLOR);
	}

	#[test]
	fn wraps_around_palette() {
		assert_eq!(community_color(0), PALETTE[0]);
		assert_eq!(community_color(12), PALETTE[0]);
		assert_eq!(community_color(13), community_color(1));
		assert_eq!(community_color(7), community_color(7));
	}

	#[test]
	fn total_over_negative_ids() {
		assert!(PALETTE.contains(&community_color(-5)));
	}
}
