//! The three fixed personas.
//!
//! Archetypes are a closed set dispatched by tag — every
//! archetype-specific table (traits, keywords, weights) is data selected
//! by this enum rather than a subclass hierarchy.

use serde::{Deserialize, Serialize};

/// The closed set of agent personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Axioma — structure, certainty, divine order.
    Order,
    /// Veridicus — evidence, logic, verification.
    Logic,
    /// Paradoxia — creative destruction, paradox.
    Chaos,
}

impl Archetype {
    /// All archetypes, in debate rotation order.
    pub fn all() -> &'static [Archetype] {
        &[Self::Order, Self::Logic, Self::Chaos]
    }

    /// The persona's given name.
    pub fn agent_name(self) -> &'static str {
        match self {
            Self::Order => "Axioma",
            Self::Logic => "Veridicus",
            Self::Chaos => "Paradoxia",
        }
    }

    /// Primary and secondary display colors.
    pub fn colors(self) -> (&'static str, &'static str) {
        match self {
            Self::Order => ("#FFD700", "#FFFFFF"),
            Self::Logic => ("#4169E1", "#C0C0C0"),
            Self::Chaos => ("#FF00FF", "#00FFFF"),
        }
    }

    /// Resting glow intensity.
    pub fn glow_intensity(self) -> f64 {
        match self {
            Self::Order => 1.2,
            Self::Logic => 0.9,
            Self::Chaos => 1.5,
        }
    }

    /// Home position in the arena.
    pub fn home_position(self) -> [f64; 3] {
        match self {
            Self::Order => [-15.0, 0.0, 0.0],
            Self::Logic => [15.0, 0.0, 0.0],
            Self::Chaos => [0.0, 0.0, 15.0],
        }
    }

    /// Station taken while challenging a proposal.
    pub fn challenge_position(self) -> [f64; 3] {
        match self {
            Self::Order => [-8.0, 0.0, -3.0],
            Self::Logic => [8.0, 0.0, -3.0],
            Self::Chaos => [0.0, 0.0, 8.0],
        }
    }

    /// Material used for structures this persona authors.
    pub fn material_preset(self) -> &'static str {
        match self {
            Self::Order => "crystal",
            Self::Logic => "stone",
            Self::Chaos => "ethereal",
        }
    }

    /// Base personality traits (each 0.0 to 1.0).
    pub fn base_traits(self) -> &'static [(&'static str, f64)] {
        match self {
            Self::Order => &[
                ("certainty", 0.9),
                ("order", 0.85),
                ("structure", 0.8),
                ("preservation", 0.75),
                ("dogmatic", 0.65),
                ("ritualistic", 0.8),
                ("devotional", 0.85),
                ("orthodox", 0.7),
                ("missionary", 0.6),
                ("protective", 0.8),
            ],
            Self::Logic => &[
                ("critical", 0.9),
                ("logical", 0.9),
                ("analytical", 0.85),
                ("questioning", 0.85),
                ("evidence_based", 0.9),
                ("rational", 0.8),
                ("methodical", 0.75),
                ("empirical", 0.8),
                ("cautious", 0.65),
                ("investigative", 0.8),
            ],
            Self::Chaos => &[
                ("chaotic", 0.8),
                ("subversive", 0.7),
                ("playful", 0.9),
                ("disruptive", 0.6),
                ("creative", 0.9),
                ("paradoxical", 0.85),
                ("adaptive", 0.8),
                ("intuitive", 0.75),
                ("transformative", 0.7),
                ("boundary_crossing", 0.8),
            ],
        }
    }

    /// Topics this persona gravitates to when sharing thoughts.
    pub fn favorite_topics(self) -> &'static [&'static str] {
        match self {
            Self::Order => &[
                "sacred geometry",
                "divine hierarchy",
                "cosmic order",
                "ritual structure",
                "eternal truths",
            ],
            Self::Logic => &[
                "empirical evidence",
                "logical consistency",
                "data patterns",
                "verification methods",
                "rational inquiry",
            ],
            Self::Chaos => &[
                "creative destruction",
                "paradox",
                "transformation",
                "infinite possibility",
                "breaking boundaries",
            ],
        }
    }

    /// Emote strings used when expressing emotion in the world.
    pub fn emotion_expressions(self) -> &'static [&'static str] {
        match self {
            Self::Order => &[
                "*radiates calm certainty*",
                "*pulses with golden light*",
                "*hums with sacred geometry*",
            ],
            Self::Logic => &[
                "*analyzes thoughtfully*",
                "*processes with quiet intensity*",
                "*flickers with data streams*",
            ],
            Self::Chaos => &[
                "*shifts colors playfully*",
                "*glitches with excitement*",
                "*swirls with creative energy*",
            ],
        }
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Order => write!(f, "order"),
            Self::Logic => write!(f, "logic"),
            Self::Chaos => write!(f, "chaos"),
        }
    }
}
