use crate::consts;

/// Ground classification under a car.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Surface {
    #[default]
    Asphalt,
    Curb,
    Grass,
}

impl Surface {
    /// Grip multiplier applied to engine force and drift retention.
    #[must_use]
    pub const fn grip(self) -> f32 {
        match self {
            Self::Asphalt => consts::CAR_GRIP,
            Self::Curb => consts::CURB_GRIP,
            Self::Grass => consts::GRASS_GRIP,
        }
    }

    /// Extra drag force, signed by direction of travel.
    #[must_use]
    pub const fn drag(self) -> f32 {
        match self {
            Self::Asphalt => 0.0,
            Self::Curb => consts::CURB_DRAG,
            Self::Grass => consts::GRASS_DRAG,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Asphalt => "asphalt",
            Self::Curb => "curb",
            Self::Grass => "grass",
        }
    }
}
