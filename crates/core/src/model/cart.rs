use serde::{Deserialize, Serialize};

use crate::model::ids::{CartItemId, CourseId};

/// One course sitting in the learner's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    id: CartItemId,
    course_id: CourseId,
    title: String,
    unit_price_cents: u32,
}

impl CartItem {
    #[must_use]
    pub fn new(
        id: CartItemId,
        course_id: CourseId,
        title: impl Into<String>,
        unit_price_cents: u32,
    ) -> Self {
        Self {
            id,
            course_id,
            title: title.into(),
            unit_price_cents,
        }
    }

    #[must_use]
    pub fn id(&self) -> CartItemId {
        self.id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn unit_price_cents(&self) -> u32 {
        self.unit_price_cents
    }
}
