//! JavaScript surface for non-Rust page scripts.

use crate::engine::{WebContext, open_web_context};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use summit_engagement::{NewEvent, SubscriptionId};
use wasm_bindgen::prelude::*;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(JsValue::from)
}

/// Engagement handle exported to JavaScript as `EngagementHandle`.
#[wasm_bindgen]
pub struct EngagementHandle {
    ctx: WebContext,
}

impl Default for EngagementHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl EngagementHandle {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            ctx: open_web_context(),
        }
    }

    /// Record `action`; returns the outcome as a plain object.
    ///
    /// # Errors
    /// Returns an error if the outcome cannot be converted to a JS value.
    pub fn award(&self, action: &str, points: Option<u32>) -> Result<JsValue, JsValue> {
        to_js(&self.ctx.award(action, points))
    }

    /// Record `action` tagged with an opaque id such as a trip slug.
    ///
    /// # Errors
    /// Returns an error if the outcome cannot be converted to a JS value.
    #[wasm_bindgen(js_name = awardFor)]
    pub fn award_for(
        &self,
        action: &str,
        subject: &str,
        points: Option<u32>,
    ) -> Result<JsValue, JsValue> {
        let new = NewEvent::new(action).subject(subject).maybe_points(points);
        to_js(&self.ctx.record(new))
    }

    /// # Errors
    /// Returns an error if the unlocks cannot be converted to a JS value.
    pub fn tick(&self) -> Result<JsValue, JsValue> {
        to_js(&self.ctx.tick())
    }

    /// # Errors
    /// Returns an error if progress cannot be converted to a JS value.
    pub fn progress(&self) -> Result<JsValue, JsValue> {
        to_js(&self.ctx.progress())
    }

    /// # Errors
    /// Returns an error if the score cannot be converted to a JS value.
    #[wasm_bindgen(js_name = leadScore)]
    pub fn lead_score(&self) -> Result<JsValue, JsValue> {
        to_js(&self.ctx.lead_score())
    }

    /// # Errors
    /// Returns an error if the challenges cannot be converted to a JS value.
    pub fn challenges(&self) -> Result<JsValue, JsValue> {
        to_js(&self.ctx.challenges())
    }

    /// # Errors
    /// Returns an error if the records cannot be converted to a JS value.
    pub fn achievements(&self) -> Result<JsValue, JsValue> {
        to_js(&self.ctx.achievements())
    }

    /// Call `callback(notification)` for every engine notification.
    /// Returns an id for [`EngagementHandle::unsubscribe`].
    pub fn subscribe(&self, callback: js_sys::Function) -> u64 {
        self.ctx
            .subscribe(move |note| {
                let delivered = to_js(note)
                    .and_then(|value| callback.call1(&JsValue::NULL, &value));
                if let Err(err) = delivered {
                    log::warn!(
                        "engagement listener failed: {}",
                        crate::dom::js_error_message(&err)
                    );
                }
            })
            .raw()
    }

    pub fn unsubscribe(&self, id: u64) -> bool {
        self.ctx.unsubscribe(SubscriptionId::from_raw(id))
    }

    /// Forget all progress in this browser.
    ///
    /// # Errors
    /// Returns an error if the stored snapshot cannot be removed.
    pub fn reset(&self) -> Result<(), JsValue> {
        self.ctx
            .reset()
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }
}
