//! Recommendation module - locating an exercise by id
//!
//! Sources are tried in a fixed order: fetched recommendations, custom
//! exercises, then exercises generated on the spot from the dog profile.

pub mod generator;
pub mod import;

pub use generator::{LocalGenerator, RecommendationGenerator};
pub use import::{Import, parse_recommendations};

use tracing::{debug, info};

use crate::error::{NotFoundReason, PlaybackError, Result};
use crate::exercises::Exercise;
use crate::profile::DogProfile;

/// Where a resolved exercise came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Fetched,
    Custom,
    Generated,
}

/// One place an exercise can be looked up
pub trait ExerciseSource {
    fn origin(&self) -> Origin;
    fn find_by_id(&self, id: &str) -> Option<Exercise>;
}

/// Already-held list of exercises (fetched or custom pool)
pub struct PoolSource<'a> {
    origin: Origin,
    pool: &'a [Exercise],
}

impl<'a> PoolSource<'a> {
    pub fn fetched(pool: &'a [Exercise]) -> Self {
        Self { origin: Origin::Fetched, pool }
    }

    pub fn custom(pool: &'a [Exercise]) -> Self {
        Self { origin: Origin::Custom, pool }
    }
}

impl ExerciseSource for PoolSource<'_> {
    fn origin(&self) -> Origin {
        self.origin
    }

    fn find_by_id(&self, id: &str) -> Option<Exercise> {
        self.pool.iter().find(|e| e.id == id).cloned()
    }
}

/// Generates candidates from a profile on each lookup. Results are never stored.
pub struct GeneratedSource<'a> {
    profile: &'a DogProfile,
    generator: &'a dyn RecommendationGenerator,
}

impl<'a> GeneratedSource<'a> {
    pub fn new(profile: &'a DogProfile, generator: &'a dyn RecommendationGenerator) -> Self {
        Self { profile, generator }
    }
}

impl ExerciseSource for GeneratedSource<'_> {
    fn origin(&self) -> Origin {
        Origin::Generated
    }

    fn find_by_id(&self, id: &str) -> Option<Exercise> {
        let mut exercise = self
            .generator
            .generate(self.profile)
            .into_iter()
            .find(|e| e.id == id)?;
        // generators don't set this reliably
        exercise.is_custom = false;
        Some(exercise)
    }
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub exercise: Exercise,
    pub origin: Origin,
}

/// Ordered lookup over exercise sources
#[derive(Default)]
pub struct Resolver<'a> {
    sources: Vec<Box<dyn ExerciseSource + 'a>>,
    profile_available: bool,
}

impl<'a> Resolver<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl ExerciseSource + 'a) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Append the generated source when a profile is present
    pub fn with_fallback(
        mut self,
        profile: Option<&'a DogProfile>,
        generator: &'a dyn RecommendationGenerator,
    ) -> Self {
        if let Some(profile) = profile {
            self.profile_available = true;
            self.sources.push(Box::new(GeneratedSource::new(profile, generator)));
        }
        self
    }

    /// First source with a matching id wins
    pub fn resolve(&self, id: &str) -> Result<Resolved> {
        for source in &self.sources {
            if let Some(exercise) = source.find_by_id(id) {
                debug!("resolved {} from {:?}", id, source.origin());
                return Ok(Resolved { exercise, origin: source.origin() });
            }
        }

        let reason = if self.profile_available {
            NotFoundReason::StaleId
        } else {
            NotFoundReason::NoProfile
        };
        info!("exercise {} not found: {}", id, reason);
        Err(PlaybackError::NotFound(reason))
    }
}

/// Everything the standard lookup order needs
pub struct Sources<'a> {
    pub fetched: &'a [Exercise],
    pub custom: &'a [Exercise],
    pub fallback_profile: Option<&'a DogProfile>,
}

/// Resolve `id` through fetched, custom, then generated exercises
pub fn resolve(
    id: &str,
    sources: &Sources<'_>,
    generator: &dyn RecommendationGenerator,
) -> Result<Resolved> {
    Resolver::new()
        .with_source(PoolSource::fetched(sources.fetched))
        .with_source(PoolSource::custom(sources.custom))
        .with_fallback(sources.fallback_profile, generator)
        .resolve(id)
}
