//! Hoverable engine parts and their descriptions.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    Piston,
    Rod,
    Crank,
    IntakeValve,
    ExhaustValve,
    SparkPlug,
    Head,
    Cylinder,
}

/// Static title and description shown while a part is hovered
#[derive(Debug, Clone, Copy)]
pub struct PartInfo {
    pub title: &'static str,
    pub description: &'static str,
}

impl Part {
    pub const ALL: [Part; 8] = [
        Part::Piston,
        Part::Rod,
        Part::Crank,
        Part::IntakeValve,
        Part::ExhaustValve,
        Part::SparkPlug,
        Part::Head,
        Part::Cylinder,
    ];

    /// Stable identifier, matches the names used in logs
    pub fn id(self) -> &'static str {
        match self {
            Part::Piston => "piston",
            Part::Rod => "rod",
            Part::Crank => "crank",
            Part::IntakeValve => "intakeValve",
            Part::ExhaustValve => "exhaustValve",
            Part::SparkPlug => "sparkPlug",
            Part::Head => "head",
            Part::Cylinder => "cylinder",
        }
    }

    pub fn info(self) -> PartInfo {
        match self {
            Part::Piston => PartInfo {
                title: "Piston",
                description: "Takes the combustion pressure and slides up and down the \
                              cylinder, turning heat into mechanical work.",
            },
            Part::Rod => PartInfo {
                title: "Connecting Rod",
                description: "Links the piston to the crankshaft, converting the piston's \
                              back-and-forth motion into rotation.",
            },
            Part::Crank => PartInfo {
                title: "Crankshaft",
                description: "The engine's main rotating part. Turns the force from the \
                              connecting rod into output torque.",
            },
            Part::IntakeValve => PartInfo {
                title: "Intake Valve",
                description: "Lets the air/fuel mixture into the cylinder. Open only during \
                              the intake stroke.",
            },
            Part::ExhaustValve => PartInfo {
                title: "Exhaust Valve",
                description: "Lets the burnt gas out of the cylinder. Open only during the \
                              exhaust stroke.",
            },
            Part::SparkPlug => PartInfo {
                title: "Spark Plug",
                description: "Fires an electric spark that ignites the compressed mixture \
                              and starts the power stroke.",
            },
            Part::Head => PartInfo {
                title: "Cylinder Head",
                description: "Closes off the top of the cylinder to form the combustion \
                              chamber. Carries the valves and the spark plug.",
            },
            Part::Cylinder => PartInfo {
                title: "Cylinder",
                description: "The cylindrical bore that guides the piston's \
                              reciprocating motion.",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = Part::ALL.iter().map(|p| p.id()).collect();
        assert_eq!(ids.len(), Part::ALL.len());
    }

    #[test]
    fn every_part_is_described() {
        for part in Part::ALL {
            let info = part.info();
            assert!(!info.title.is_empty());
            assert!(!info.description.is_empty());
        }
    }
}
