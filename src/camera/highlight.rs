//! Opaciteitsbeleid voor meshes rond de actieve ROI.
//!
//! De opaciteit van niet-geselecteerde meshes volgt de camerabeweging: hoe
//! verder de live pose van de startpose naar de doelpose is gereisd, hoe
//! dichter de opaciteit bij de doelwaarde ligt. De voortgang wordt gemeten
//! over afstand, hoogte en look-at samen, zodat ook een zoom met gelijke
//! afstand geleidelijk vervaagt.

use super::pose::{CameraPose, lerp};

#[derive(Debug, Clone, Copy, PartialEq)]
struct OpacityRamp {
    from: CameraPose,
    to: CameraPose,
    from_opacity: f64,
    to_opacity: f64,
}

impl OpacityRamp {
    fn opacity_at(&self, live: &CameraPose, resolution: f64) -> f64 {
        let progress = live.travel_progress(&self.from, &self.to, resolution);
        lerp(self.from_opacity, self.to_opacity, progress)
    }
}

/// Houdt bij welke mesh uitgelicht is en hoe doorzichtig de rest is.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshHighlight {
    active: Option<String>,
    faded_opacity: f64,
    resolution: f64,
    background: f64,
    ramp: Option<OpacityRamp>,
}

impl MeshHighlight {
    /// `resolution` is dezelfde tolerantie waarmee de camera een doel bereikt.
    #[must_use]
    pub fn new(faded_opacity: f64, resolution: f64) -> Self {
        Self {
            active: None,
            faded_opacity,
            resolution,
            background: 1.0,
            ramp: None,
        }
    }

    /// Selecteert een nieuwe ROI en start een ramp naar de vervaagde opaciteit
    /// over de reis van `from` naar `to`. Zonder ROI wordt alles direct
    /// volledig ondoorzichtig.
    pub fn focus(&mut self, region: Option<&str>, from: &CameraPose, to: &CameraPose) {
        match region {
            Some(name) => {
                self.active = Some(name.to_owned());
                self.ramp = Some(OpacityRamp {
                    from: *from,
                    to: *to,
                    from_opacity: self.background,
                    to_opacity: self.faded_opacity,
                });
            }
            None => self.clear(),
        }
    }

    /// Start een ramp terug naar volledige opaciteit bij het uitzoomen.
    pub fn release(&mut self, from: &CameraPose, to: &CameraPose) {
        if self.active.is_none() {
            return;
        }
        self.ramp = Some(OpacityRamp {
            from: *from,
            to: *to,
            from_opacity: self.background,
            to_opacity: 1.0,
        });
    }

    /// Werk de achtergrondopaciteit bij op basis van de live pose.
    pub fn track(&mut self, live: &CameraPose) {
        if let Some(ramp) = self.ramp {
            self.background = ramp.opacity_at(live, self.resolution);
        }
    }

    /// Zet de opaciteit op de eindwaarde van de lopende ramp.
    pub fn settle(&mut self) {
        if let Some(ramp) = self.ramp.take() {
            self.background = ramp.to_opacity;
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.background = 1.0;
        self.ramp = None;
    }

    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Opaciteit van alle meshes behalve de actieve ROI.
    #[must_use]
    pub fn background_opacity(&self) -> f64 {
        if self.active.is_some() {
            self.background
        } else {
            1.0
        }
    }

    #[must_use]
    pub fn opacity_for(&self, mesh_name: &str) -> f64 {
        match self.active.as_deref() {
            Some(active) if active != mesh_name => self.background,
            _ => 1.0,
        }
    }
}
