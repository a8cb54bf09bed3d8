//! Collision filter policy.
//!
//! Every candidate shape pair goes through a [`FilterShader`] before the
//! course reacts to it. The shader only sees the two shapes' attribute bits
//! and filter words and decides whether the pair is a trigger pair or a
//! contact pair, and which touch notifications it raises.

use bitflags::bitflags;

/// Filter group bits written into `word0` (and masks into `word1`).
pub struct FilterGroup;

impl FilterGroup {
    pub const ACTOR0: u32 = 1 << 0;
    pub const ACTOR1: u32 = 1 << 1;
    pub const ACTOR2: u32 = 1 << 2;
}

/// The two filter words of a shape: `word0` is "I am", `word1` is "I react to".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FilterData {
    pub word0: u32,
    pub word1: u32,
}

impl FilterData {
    pub const fn new(word0: u32, word1: u32) -> Self {
        Self { word0, word1 }
    }

    /// True when `self` reacts to at least one group `other` belongs to.
    pub fn reacts_to(&self, other: &FilterData) -> bool {
        self.word1 & other.word0 != 0
    }
}

bitflags! {
    /// Per-shape attribute bits handed to the filter shader.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FilterAttributes: u32 {
        const TRIGGER = 1 << 0;
        const STATIC_BODY = 1 << 1;
        const DYNAMIC_BODY = 1 << 2;
    }
}

bitflags! {
    /// Behaviour and notification mask requested for a pair.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PairFlags: u32 {
        const SOLVE_CONTACT = 1 << 0;
        const DETECT_DISCRETE_CONTACT = 1 << 1;
        const NOTIFY_TOUCH_FOUND = 1 << 2;
        const NOTIFY_TOUCH_LOST = 1 << 3;

        const TRIGGER_DEFAULT = Self::NOTIFY_TOUCH_FOUND.bits()
            | Self::NOTIFY_TOUCH_LOST.bits()
            | Self::DETECT_DISCRETE_CONTACT.bits();
        const CONTACT_DEFAULT = Self::SOLVE_CONTACT.bits()
            | Self::DETECT_DISCRETE_CONTACT.bits();
    }
}

/// Everything the shader knows about one side of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FilterInput {
    pub attributes: FilterAttributes,
    pub data: FilterData,
}

impl FilterInput {
    pub fn new(attributes: FilterAttributes, data: FilterData) -> Self {
        Self { attributes, data }
    }

    pub fn is_trigger(&self) -> bool {
        self.attributes.contains(FilterAttributes::TRIGGER)
    }
}

/// Classification of a shape pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairClass {
    /// Dropped entirely. The course shader never produces it.
    Ignore,
    /// Enter/exit notifications only, no contact response.
    Trigger,
    /// Physical contact response.
    Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairDecision {
    pub class: PairClass,
    pub flags: PairFlags,
}

impl PairDecision {
    pub fn notifies_touch_found(&self) -> bool {
        self.flags.contains(PairFlags::NOTIFY_TOUCH_FOUND)
    }

    pub fn notifies_touch_lost(&self) -> bool {
        self.flags.contains(PairFlags::NOTIFY_TOUCH_LOST)
    }

    /// Whether the engine tracks the pair at all. Ignored pairs and pairs
    /// with neither detection nor notification flags are skipped.
    pub fn detects(&self) -> bool {
        self.class != PairClass::Ignore
            && self.flags.intersects(
                PairFlags::DETECT_DISCRETE_CONTACT | PairFlags::NOTIFY_TOUCH_FOUND | PairFlags::NOTIFY_TOUCH_LOST,
            )
    }

    /// Whether the solver pushes the pair apart.
    pub fn solves_contact(&self) -> bool {
        self.class == PairClass::Contact && self.flags.contains(PairFlags::SOLVE_CONTACT)
    }
}

/// A decision that drops the pair entirely.
pub const IGNORE_PAIR: PairDecision = PairDecision {
    class: PairClass::Ignore,
    flags: PairFlags::empty(),
};

/// Signature of a per-pair filter function.
pub type FilterShader = fn(a: &FilterInput, b: &FilterInput) -> PairDecision;

/// Filter shader used by the course.
///
/// 1. A pair with any trigger shape is a trigger pair with default trigger
///    notifications.
/// 2. Otherwise it is a contact pair; touch found/lost notifications are
///    added when each shape's mask contains the other's group.
pub fn course_filter_shader(a: &FilterInput, b: &FilterInput) -> PairDecision {
    if a.is_trigger() || b.is_trigger() {
        return PairDecision {
            class: PairClass::Trigger,
            flags: PairFlags::TRIGGER_DEFAULT,
        };
    }

    let mut flags = PairFlags::CONTACT_DEFAULT;
    if a.data.reacts_to(&b.data) && b.data.reacts_to(&a.data) {
        flags |= PairFlags::NOTIFY_TOUCH_FOUND | PairFlags::NOTIFY_TOUCH_LOST;
    }
    PairDecision {
        class: PairClass::Contact,
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORDS: [u32; 6] = [0, 1, 2, 3, 4, 0xFFFF_FFFF];

    fn all_inputs() -> Vec<FilterInput> {
        let mut inputs = Vec::new();
        for attributes in [
            FilterAttributes::empty(),
            FilterAttributes::TRIGGER,
            FilterAttributes::STATIC_BODY,
            FilterAttributes::TRIGGER | FilterAttributes::DYNAMIC_BODY,
        ] {
            for word0 in WORDS {
                for word1 in WORDS {
                    inputs.push(FilterInput::new(attributes, FilterData::new(word0, word1)));
                }
            }
        }
        inputs
    }

    #[test]
    fn test_decision_is_symmetric() {
        let inputs = all_inputs();
        for a in &inputs {
            for b in &inputs {
                assert_eq!(
                    course_filter_shader(a, b),
                    course_filter_shader(b, a),
                    "asymmetric for {:?} / {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_any_trigger_makes_trigger_pair() {
        let inputs = all_inputs();
        for a in inputs.iter().filter(|i| i.is_trigger()) {
            for b in &inputs {
                let decision = course_filter_shader(a, b);
                assert_eq!(decision.class, PairClass::Trigger);
                assert_eq!(decision.flags, PairFlags::TRIGGER_DEFAULT);
                assert!(!decision.flags.contains(PairFlags::SOLVE_CONTACT));
            }
        }
    }

    #[test]
    fn test_contact_notifications_iff_mutual_interest() {
        let inputs = all_inputs();
        for a in inputs.iter().filter(|i| !i.is_trigger()) {
            for b in inputs.iter().filter(|i| !i.is_trigger()) {
                let decision = course_filter_shader(a, b);
                assert_eq!(decision.class, PairClass::Contact);
                assert!(decision.flags.contains(PairFlags::CONTACT_DEFAULT));
                let mutual = (a.data.word0 & b.data.word1) != 0 && (b.data.word0 & a.data.word1) != 0;
                assert_eq!(decision.notifies_touch_found(), mutual);
                assert_eq!(decision.notifies_touch_lost(), mutual);
            }
        }
    }

    #[test]
    fn test_one_sided_interest_is_silent() {
        let ball = FilterInput::new(
            FilterAttributes::DYNAMIC_BODY,
            FilterData::new(FilterGroup::ACTOR0, FilterGroup::ACTOR1),
        );
        let wall = FilterInput::new(
            FilterAttributes::STATIC_BODY,
            FilterData::new(FilterGroup::ACTOR1, FilterGroup::ACTOR2),
        );
        let decision = course_filter_shader(&ball, &wall);
        assert_eq!(decision.flags, PairFlags::CONTACT_DEFAULT);
    }

    #[test]
    fn test_default_filter_words_raise_no_contact_notifications() {
        let a = FilterInput::default();
        let b = FilterInput::default();
        let decision = course_filter_shader(&a, &b);
        assert_eq!(decision.class, PairClass::Contact);
        assert!(!decision.notifies_touch_found());
    }

    #[test]
    fn test_engine_view_of_decisions() {
        let plain = FilterInput::default();
        let trigger = FilterInput::new(FilterAttributes::TRIGGER, FilterData::default());

        let contact = course_filter_shader(&plain, &plain);
        assert!(contact.detects());
        assert!(contact.solves_contact());

        let sensor = course_filter_shader(&trigger, &plain);
        assert!(sensor.detects());
        assert!(!sensor.solves_contact());

        assert!(!IGNORE_PAIR.detects());
        assert!(!IGNORE_PAIR.solves_contact());
    }
}
