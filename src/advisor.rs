use crate::taxonomy::CanonicalClass;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Class whose absence from an image is itself a warning.
pub const MANDATORY_CLASS: CanonicalClass = CanonicalClass::Seatbelt;

pub const MISSING_SEATBELT: &str = "Please fasten your seatbelt for your safety.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvisoryMessage {
    pub text: &'static str,
    pub polarity: Polarity,
}

impl AdvisoryMessage {
    const fn positive(text: &'static str) -> Self {
        Self {
            text,
            polarity: Polarity::Positive,
        }
    }

    const fn negative(text: &'static str) -> Self {
        Self {
            text,
            polarity: Polarity::Negative,
        }
    }
}

/// Advisory shown when `class` is detected, if any.
pub fn message_for(class: &CanonicalClass) -> Option<AdvisoryMessage> {
    let message = match class {
        CanonicalClass::Seatbelt => {
            AdvisoryMessage::positive("Thank you for wearing your seatbelt. Stay safe!")
        }
        CanonicalClass::Drinking => AdvisoryMessage::negative("Avoid drinking while driving."),
        CanonicalClass::Smoking => {
            AdvisoryMessage::negative("Smoking while driving is unsafe and distracting.")
        }
        CanonicalClass::PhoneUsage => AdvisoryMessage::negative(
            "Do not use your phone while driving. Pull over if necessary.",
        ),
        CanonicalClass::Drowsy => {
            AdvisoryMessage::negative("You appear drowsy. Please take a break and rest.")
        }
        CanonicalClass::Eating => AdvisoryMessage::negative(
            "Eating while driving can be distracting. Please focus on the road.",
        ),
        CanonicalClass::Distracted => {
            AdvisoryMessage::negative("Please focus on the road and avoid distractions.")
        }
        CanonicalClass::SafeDriving | CanonicalClass::Other(_) => return None,
    };
    Some(message)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SafetyInstructionSet {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl SafetyInstructionSet {
    fn push(&mut self, message: AdvisoryMessage) {
        let list = match message.polarity {
            Polarity::Positive => &mut self.positive,
            Polarity::Negative => &mut self.negative,
        };
        list.push(message.text.to_string());
    }
}

/// Derive advisories from the classes that survived fusion.
///
/// The missing-seatbelt warning always comes first; the rest follow the
/// declared class order regardless of how `present` was built.
pub fn advise(present: &BTreeSet<CanonicalClass>) -> SafetyInstructionSet {
    let mut instructions = SafetyInstructionSet::default();

    if !present.contains(&MANDATORY_CLASS) {
        instructions.push(AdvisoryMessage::negative(MISSING_SEATBELT));
    }

    for class in CanonicalClass::DECLARED {
        if present.contains(class)
            && let Some(message) = message_for(class)
        {
            instructions.push(message);
        }
    }

    instructions
}
