//! Camerapose en de bijbehorende rekenregels: framing, tolerantievergelijking,
//! lerp en yaw-normalisatie.

use std::f64::consts::TAU;

use serde::Serialize;

use crate::config::AnimationSettings;

/// Live configuratie van de camera rond het look-at punt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    /// Afstand van de camera tot het look-at punt langs de kijkas.
    pub distance: f64,
    /// Hoogte van de camera boven het look-at punt.
    pub height: f64,
    pub look_at: [f64; 3],
    /// Rotatie van de boom rond de y-as, altijd binnen `[0, 2π)`.
    pub yaw: f64,
}

impl CameraPose {
    /// Pose die een vorm met het gegeven middelpunt in beeld brengt.
    ///
    /// `distance = distance_ratio * min(shape.x, shape.y)` en
    /// `height = shape.z * height_ratio`.
    #[must_use]
    pub fn framing(shape: [f64; 3], origin: [f64; 3], settings: &AnimationSettings) -> Self {
        Self {
            distance: settings.distance_ratio * shape[0].min(shape[1]),
            height: shape[2] * settings.height_ratio,
            look_at: origin,
            yaw: 0.0,
        }
    }

    #[must_use]
    pub fn with_yaw(mut self, yaw: f64) -> Self {
        self.yaw = wrap_yaw(yaw);
        self
    }

    /// Vergelijkt afstand, hoogte en look-at per as binnen `resolution`.
    /// De yaw telt niet mee.
    #[must_use]
    pub fn matches(&self, other: &CameraPose, resolution: f64) -> bool {
        within(self.distance, other.distance, resolution)
            && within(self.height, other.height, resolution)
            && self
                .look_at
                .iter()
                .zip(other.look_at.iter())
                .all(|(a, b)| within(*a, *b, resolution))
    }

    /// Beweegt elke scalaire as een fractie `alpha` richting `target`. Assen die
    /// al binnen de tolerantie liggen blijven staan.
    pub fn lerp_towards(&mut self, target: &CameraPose, alpha: f64, resolution: f64) {
        self.distance = lerp_if_required(self.distance, target.distance, alpha, resolution);
        self.height = lerp_if_required(self.height, target.height, alpha, resolution);
        for (current, goal) in self.look_at.iter_mut().zip(target.look_at.iter()) {
            *current = lerp_if_required(*current, *goal, alpha, resolution);
        }
    }

    /// Afgelegd deel van de reis van `start` naar `target`, in `[0, 1]`.
    ///
    /// Per as (afstand, hoogte, look-at) telt het resterende deel van de
    /// oorspronkelijke afstand; de traagste as bepaalt de voortgang. Assen die
    /// al binnen `resolution` begonnen tellen niet mee. Begint elke as binnen
    /// de tolerantie, dan is de reis meteen voltooid.
    #[must_use]
    pub fn travel_progress(&self, start: &CameraPose, target: &CameraPose, resolution: f64) -> f64 {
        let remaining = self
            .axes()
            .into_iter()
            .zip(start.axes())
            .zip(target.axes())
            .filter(|((_, from), to)| !within(*from, *to, resolution))
            .map(|((current, from), to)| ((to - current) / (to - from)).clamp(0.0, 1.0))
            .fold(0.0_f64, f64::max);
        1.0 - remaining
    }

    fn axes(&self) -> [f64; 5] {
        [
            self.distance,
            self.height,
            self.look_at[0],
            self.look_at[1],
            self.look_at[2],
        ]
    }

    /// Draait de boom en normaliseert de yaw.
    pub fn rotate(&mut self, delta: f64) {
        self.yaw = wrap_yaw(self.yaw + delta);
    }

    /// Afgeleide posities voor de renderer.
    #[must_use]
    pub fn rig(&self, light_distance_ratio: f64) -> CameraRig {
        CameraRig {
            boom_position: self.look_at,
            boom_yaw: self.yaw,
            camera_local: [0.0, self.height, self.distance],
            light_local: [
                0.0,
                self.height * light_distance_ratio,
                self.distance * light_distance_ratio,
            ],
        }
    }
}

/// Scenegraph-posities die de renderer rechtstreeks kan toepassen: een boom
/// op het look-at punt met daaraan de camera en het puntlicht.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraRig {
    pub boom_position: [f64; 3],
    pub boom_yaw: f64,
    pub camera_local: [f64; 3],
    pub light_local: [f64; 3],
}

/// Normaliseert een hoek naar `[0, 2π)`. Niet-eindige invoer wordt 0.
#[must_use]
pub fn wrap_yaw(yaw: f64) -> f64 {
    if !yaw.is_finite() {
        return 0.0;
    }

    let wrapped = yaw.rem_euclid(TAU);
    // rem_euclid kan door afronding exact TAU opleveren voor kleine negatieve hoeken
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[must_use]
pub fn within(a: f64, b: f64, resolution: f64) -> bool {
    (a - b).abs() < resolution
}

#[must_use]
pub fn lerp(from: f64, to: f64, alpha: f64) -> f64 {
    from + (to - from) * alpha
}

fn lerp_if_required(current: f64, target: f64, alpha: f64, resolution: f64) -> f64 {
    if within(current, target, resolution) {
        current
    } else {
        lerp(current, target, alpha)
    }
}
