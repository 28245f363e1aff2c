//! Centralized tuning constants for the Summit engagement engine.
//!
//! The built-in point table and achievement catalog live here so that
//! conversion tuning only changes through reviewed code. Static assets may
//! override them at load time through [`crate::EngagementConfig`].

// Storage -------------------------------------------------------------------
pub const STORAGE_KEY: &str = "summit.engagement";

// Progress ------------------------------------------------------------------
pub const LEVEL_SPAN: u32 = 100;
pub const HISTORY_CAP: usize = 100;

// Actions -------------------------------------------------------------------
pub const ACTION_PAGE_LOAD: &str = "page_load";
pub const ACTION_TRIP_VIEW: &str = "trip_view";
pub const ACTION_GALLERY_OPEN: &str = "gallery_open";
pub const ACTION_WEATHER_CHECK: &str = "weather_check";
pub const ACTION_ITINERARY_VIEW: &str = "itinerary_view";
pub const ACTION_PRICE_CALCULATOR: &str = "price_calculator";
pub const ACTION_CALENDAR_CHECK: &str = "calendar_check";
pub const ACTION_FAQ_OPEN: &str = "faq_open";
pub const ACTION_SHARE: &str = "share";
pub const ACTION_REVIEW_READ: &str = "review_read";
pub const ACTION_NEWSLETTER_SIGNUP: &str = "newsletter_signup";
pub const ACTION_QUIZ_COMPLETE: &str = "quiz_complete";
pub const ACTION_LEAD_FORM_SUBMIT: &str = "lead_form_submit";
pub const ACTION_PAYMENT_METHOD_SELECT: &str = "payment_method_select";
pub const ACTION_BOOKING_STARTED: &str = "booking_started";
pub const ACTION_BOOKING_CREATED: &str = "booking_created";
pub const ACTION_PAYMENT_PROOF_SUBMITTED: &str = "payment_proof_submitted";
pub const ACTION_ACHIEVEMENT_UNLOCKED: &str = "achievement_unlocked";

// Rule ids ------------------------------------------------------------------
pub const RULE_FIRST_STEPS: &str = "first_steps";
pub const RULE_EXPLORER: &str = "explorer";
pub const RULE_WEATHER_WATCHER: &str = "weather_watcher";
pub const RULE_PLANNER: &str = "planner";
pub const RULE_SOCIAL_BUTTERFLY: &str = "social_butterfly";
pub const RULE_DEDICATED: &str = "dedicated";
pub const RULE_CENTURY: &str = "century";
pub const RULE_HIGH_ROLLER: &str = "high_roller";
pub const RULE_READY_TO_ROLL: &str = "ready_to_roll";
pub const RULE_TRAILBLAZER: &str = "trailblazer";

pub(crate) const DEDICATED_SESSION_MS: u64 = 5 * 60 * 1000;

// Lead scoring --------------------------------------------------------------
pub(crate) const LEAD_SCORE_MAX: u32 = 100;
pub(crate) const LEAD_WARM_AT: u32 = 30;
pub(crate) const LEAD_HOT_AT: u32 = 70;
pub(crate) const LEAD_LEVEL_BONUS: u32 = 2;
pub(crate) const LEAD_WEIGHT_BROWSING: f32 = 1.0;
pub(crate) const LEAD_WEIGHT_RESEARCH: f32 = 3.0;
pub(crate) const LEAD_WEIGHT_SOCIAL: f32 = 4.0;
pub(crate) const LEAD_WEIGHT_ENGAGEMENT: f32 = 5.0;
pub(crate) const LEAD_WEIGHT_BOOKING: f32 = 12.0;
pub(crate) const LEAD_WEIGHT_ACHIEVEMENT: f32 = 0.0;
pub(crate) const LEAD_INTENT_PRICE_CALCULATOR: u32 = 10;
pub(crate) const LEAD_INTENT_CALENDAR_CHECK: u32 = 8;
pub(crate) const LEAD_INTENT_LEAD_FORM: u32 = 20;
pub(crate) const LEAD_INTENT_BOOKING_STARTED: u32 = 25;
