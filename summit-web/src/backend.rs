//! Point-earning notifications from REST and document-store callbacks.
//!
//! Request handlers call [`crate::EngagementContext::notify`] once the
//! backend confirms an operation. Returned ids ride along as the event
//! subject; the engine never inspects them.

use summit_engagement::constants::{
    ACTION_BOOKING_CREATED, ACTION_BOOKING_STARTED, ACTION_LEAD_FORM_SUBMIT,
    ACTION_PAYMENT_METHOD_SELECT, ACTION_PAYMENT_PROOF_SUBMITTED, ACTION_TRIP_VIEW,
};
use summit_engagement::NewEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Trip detail fetched by slug.
    TripLoaded { slug: String },
    /// Booking draft opened for a trip.
    BookingStarted { trip_slug: String },
    BookingCreated { booking_id: String },
    PaymentIntentCreated { booking_id: String },
    PaymentProofSubmitted { booking_id: String },
    LeadCreated { lead_id: String },
}

impl BackendEvent {
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::TripLoaded { .. } => ACTION_TRIP_VIEW,
            Self::BookingStarted { .. } => ACTION_BOOKING_STARTED,
            Self::BookingCreated { .. } => ACTION_BOOKING_CREATED,
            Self::PaymentIntentCreated { .. } => ACTION_PAYMENT_METHOD_SELECT,
            Self::PaymentProofSubmitted { .. } => ACTION_PAYMENT_PROOF_SUBMITTED,
            Self::LeadCreated { .. } => ACTION_LEAD_FORM_SUBMIT,
        }
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        match self {
            Self::TripLoaded { slug } => slug,
            Self::BookingStarted { trip_slug } => trip_slug,
            Self::BookingCreated { booking_id }
            | Self::PaymentIntentCreated { booking_id }
            | Self::PaymentProofSubmitted { booking_id } => booking_id,
            Self::LeadCreated { lead_id } => lead_id,
        }
    }
}

impl From<BackendEvent> for NewEvent {
    fn from(event: BackendEvent) -> Self {
        Self::new(event.action()).subject(event.subject())
    }
}
