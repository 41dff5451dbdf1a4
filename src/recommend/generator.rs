//! Local fallback generator - small built-in catalog filtered by profile

use crate::exercises::{Difficulty, Exercise, RawStep, normalize};
use crate::profile::{ActivityLevel, DogProfile};

/// Produces exercise candidates for a profile
pub trait RecommendationGenerator {
    fn generate(&self, profile: &DogProfile) -> Vec<Exercise>;
}

struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    difficulty: Difficulty,
    duration_minutes: u32,
    equipment: &'static [&'static str],
    steps: &'static [&'static str],
    benefits: &'static [&'static str],
    /// Left out for dogs with joint problems
    hard_on_joints: bool,
}

/// Built-in exercises. Steps are plain text, so they get default durations.
const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "1",
        name: "Donut Ball Balance",
        description: "Keep balance on a donut-shaped balance ball.",
        difficulty: Difficulty::Medium,
        duration_minutes: 10,
        equipment: &["donut_ball"],
        steps: &[
            "Put the donut ball on a flat floor.",
            "Lure the dog onto the ball so it balances with its front paws.",
            "Hold for 10 seconds, then rest.",
            "Repeat 3 times.",
        ],
        benefits: &["balance", "core strength"],
        hard_on_joints: false,
    },
    CatalogEntry {
        id: "2",
        name: "Tug of War",
        description: "Pulling game with a rope toy.",
        difficulty: Difficulty::Easy,
        duration_minutes: 15,
        equipment: &["rope toy"],
        steps: &[
            "Get the rope toy ready.",
            "Encourage the dog to grab the rope.",
            "Pull gently and play.",
            "Keep going for 15 minutes.",
        ],
        benefits: &["jaw strength", "stress relief", "bonding"],
        hard_on_joints: false,
    },
    CatalogEntry {
        id: "3",
        name: "Slalom Training",
        description: "Zigzag run between obstacles.",
        difficulty: Difficulty::Hard,
        duration_minutes: 20,
        equipment: &["cones", "treats"],
        steps: &[
            "Set the cones up in a line.",
            "Guide the dog between the cones.",
            "Reward every successful pass with a treat.",
            "Repeat 5 times.",
        ],
        benefits: &["agility", "focus", "obedience"],
        hard_on_joints: true,
    },
];

impl CatalogEntry {
    fn to_exercise(&self) -> Exercise {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Exercise {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            difficulty: self.difficulty,
            duration_minutes: self.duration_minutes,
            equipment: owned(self.equipment),
            steps: normalize(self.steps.iter().map(|s| RawStep::Text(s.to_string())).collect()),
            warmup_steps: vec![],
            cooldown_steps: vec![],
            benefits: owned(self.benefits),
            contact: None,
            is_custom: false,
            image_url: None,
        }
    }
}

/// Catalog-backed generator used when no fetched recommendation matches
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalGenerator;

impl RecommendationGenerator for LocalGenerator {
    fn generate(&self, profile: &DogProfile) -> Vec<Exercise> {
        let joint_issue = profile.has_health_issue("joint");

        let picked: Vec<Exercise> = CATALOG
            .iter()
            .filter(|e| match profile.activity_level {
                ActivityLevel::Low => e.difficulty == Difficulty::Easy,
                ActivityLevel::Medium => e.difficulty != Difficulty::Hard,
                ActivityLevel::High => true,
            })
            .filter(|e| !(joint_issue && e.hard_on_joints))
            .map(CatalogEntry::to_exercise)
            .collect();

        if picked.is_empty() {
            CATALOG.iter().take(2).map(CatalogEntry::to_exercise).collect()
        } else {
            picked
        }
    }
}
