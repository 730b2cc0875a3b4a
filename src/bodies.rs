/// Solar-system bodies known to the position generator, with their NAIF ids.
///
/// Inner planets are referenced to the planet itself while the outer planets
/// are referenced to their system barycenter, matching the names used in the
/// output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Body {
    Sun,
    Mercury,
    Venus,
    Earth,
    Mars,
    JupiterBarycenter,
    SaturnBarycenter,
    UranusBarycenter,
    NeptuneBarycenter,
    Moon,
}

/// Bodies written to every position record, in output order.
pub const TRACKED_BODIES: [Body; 9] = [
    Body::Mercury,
    Body::Venus,
    Body::Earth,
    Body::Mars,
    Body::JupiterBarycenter,
    Body::SaturnBarycenter,
    Body::UranusBarycenter,
    Body::NeptuneBarycenter,
    Body::Moon,
];

impl Body {
    pub fn naif_id(self) -> i32 {
        match self {
            Body::Sun => 10,
            Body::Mercury => 199,
            Body::Venus => 299,
            Body::Earth => 399,
            Body::Mars => 499,
            Body::JupiterBarycenter => 5,
            Body::SaturnBarycenter => 6,
            Body::UranusBarycenter => 7,
            Body::NeptuneBarycenter => 8,
            Body::Moon => 301,
        }
    }

    /// Key used for this body in position records.
    pub fn name(self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Mercury => "mercury",
            Body::Venus => "venus",
            Body::Earth => "earth",
            Body::Mars => "mars",
            Body::JupiterBarycenter => "jupiter barycenter",
            Body::SaturnBarycenter => "saturn barycenter",
            Body::UranusBarycenter => "uranus barycenter",
            Body::NeptuneBarycenter => "neptune barycenter",
            Body::Moon => "moon",
        }
    }

    /// Body the longitude is measured from: Earth for the Moon, the Sun otherwise.
    pub fn observer(self) -> Body {
        match self {
            Body::Moon => Body::Earth,
            _ => Body::Sun,
        }
    }
}

impl std::fmt::Display for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracked_bodies_are_distinct_and_ordered() {
        let names: Vec<&str> = TRACKED_BODIES.iter().map(|b| b.name()).collect();
        assert_eq!(
            names,
            vec![
                "mercury",
                "venus",
                "earth",
                "mars",
                "jupiter barycenter",
                "saturn barycenter",
                "uranus barycenter",
                "neptune barycenter",
                "moon",
            ]
        );
        assert!(!TRACKED_BODIES.contains(&Body::Sun));
    }

    #[test]
    fn test_observers() {
        assert_eq!(Body::Moon.observer(), Body::Earth);
        for body in TRACKED_BODIES.iter().filter(|b| **b != Body::Moon) {
            assert_eq!(body.observer(), Body::Sun);
        }
    }

    #[test]
    fn test_naif_ids_match_de421() {
        assert_eq!(Body::Earth.naif_id(), 399);
        assert_eq!(Body::Moon.naif_id(), 301);
        assert_eq!(Body::NeptuneBarycenter.naif_id(), 8);
    }
}
