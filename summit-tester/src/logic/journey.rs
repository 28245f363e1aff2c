use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use summit_engagement::NewEvent;
use summit_engagement::constants::{
    ACTION_BOOKING_STARTED, ACTION_GALLERY_OPEN, ACTION_ITINERARY_VIEW, ACTION_TRIP_VIEW,
};

use crate::common::scenario::{Journey, TRIP_SLUGS, VisitorProfile};

/// One visitor action in a replayable journey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub action: &'static str,
    /// `None` takes points from the table.
    pub points: Option<u32>,
    pub subject: Option<&'static str>,
    /// Clock advance before the action.
    pub dwell_ms: u64,
}

impl Step {
    pub fn to_event(&self) -> NewEvent {
        let event = NewEvent::new(self.action).maybe_points(self.points);
        match self.subject {
            Some(subject) => event.subject(subject),
            None => event,
        }
    }
}

fn is_trip_scoped(action: &str) -> bool {
    matches!(
        action,
        ACTION_TRIP_VIEW | ACTION_GALLERY_OPEN | ACTION_ITINERARY_VIEW | ACTION_BOOKING_STARTED
    )
}

/// Build the journey for `seed`. Scripted journeys ignore the seed.
pub fn build_journey(journey: &Journey, seed: u64) -> Vec<Step> {
    match journey {
        Journey::Scripted(script) => script
            .iter()
            .map(|&(action, points)| Step {
                action,
                points: Some(points),
                subject: None,
                dwell_ms: 1_000,
            })
            .collect(),
        Journey::Synthetic(profile) => synthesize(profile, seed),
    }
}

fn synthesize(profile: &VisitorProfile, seed: u64) -> Vec<Step> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let len = rng.gen_range(profile.min_steps..=profile.max_steps);
    let mut steps = Vec::with_capacity(len + profile.closing.len());

    if let Ok(dist) = WeightedIndex::new(profile.weights.iter().map(|(_, w)| *w)) {
        for _ in 0..len {
            let action = profile.weights[dist.sample(&mut rng)].0;
            steps.push(step(&mut rng, profile, action));
        }
    }
    for &action in profile.closing {
        steps.push(step(&mut rng, profile, action));
    }
    steps
}

fn step(rng: &mut ChaCha20Rng, profile: &VisitorProfile, action: &'static str) -> Step {
    let subject = is_trip_scoped(action).then(|| TRIP_SLUGS[rng.gen_range(0..TRIP_SLUGS.len())]);
    Step {
        action,
        points: None,
        subject,
        dwell_ms: rng.gen_range(0..=profile.max_dwell_ms),
    }
}
