use super::hand_analysis::HandAnalysis;
use super::HandType;

/// Each special pattern knows how to recognise itself and which type it yields.
pub trait PatternDetector {
    fn detect(&self, analysis: &HandAnalysis) -> bool;
    fn hand_type(&self) -> HandType;
}

// ============================================================================
// Detector Implementations (in priority order: highest to lowest)
// ============================================================================

/// Five Small: every card worth less than 5, total at most 10
pub struct FiveSmallDetector;

impl PatternDetector for FiveSmallDetector {
    fn detect(&self, analysis: &HandAnalysis) -> bool {
        analysis.points.iter().all(|&p| p < 5) && analysis.point_sum <= 10
    }

    fn hand_type(&self) -> HandType {
        HandType::FiveSmall
    }
}

/// Four Bomb: four cards of one rank
pub struct FourBombDetector;

impl PatternDetector for FourBombDetector {
    fn detect(&self, analysis: &HandAnalysis) -> bool {
        analysis.quad().is_some()
    }

    fn hand_type(&self) -> HandType {
        HandType::FourBomb
    }
}

/// Five Flower: all J/Q/K
pub struct FiveFlowerDetector;

impl PatternDetector for FiveFlowerDetector {
    fn detect(&self, analysis: &HandAnalysis) -> bool {
        analysis.court_cards == 5
    }

    fn hand_type(&self) -> HandType {
        HandType::FiveFlower
    }
}

/// Four Flower: four J/Q/K plus a single 10
pub struct FourFlowerDetector;

impl PatternDetector for FourFlowerDetector {
    fn detect(&self, analysis: &HandAnalysis) -> bool {
        analysis.court_cards == 4 && analysis.tens == 1
    }

    fn hand_type(&self) -> HandType {
        HandType::FourFlower
    }
}

/// Special patterns checked before the ordinary bull search.
pub const DETECTORS: [&dyn PatternDetector; 4] =
    [&FiveSmallDetector, &FourBombDetector, &FiveFlowerDetector, &FourFlowerDetector];
