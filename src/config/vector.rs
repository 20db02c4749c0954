use serde::{Deserialize, Serialize};

/// Named numeric fields of a [`ConfigVector`], in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VectorField {
    M07UB,
    M08LB,
    M08UB,
    M10LB,
    M10UB,
    M11LB,
    RthSub,
    Rth,
    RthLB,
    MaxSolZen,
    TemporalProximity,
    SpatialProximity,
}

impl VectorField {
    pub const ALL: [VectorField; 12] = [
        VectorField::M07UB,
        VectorField::M08LB,
        VectorField::M08UB,
        VectorField::M10LB,
        VectorField::M10UB,
        VectorField::M11LB,
        VectorField::RthSub,
        VectorField::Rth,
        VectorField::RthLB,
        VectorField::MaxSolZen,
        VectorField::TemporalProximity,
        VectorField::SpatialProximity,
    ];

    pub const FLOATS: [VectorField; 10] = [
        VectorField::M07UB,
        VectorField::M08LB,
        VectorField::M08UB,
        VectorField::M10LB,
        VectorField::M10UB,
        VectorField::M11LB,
        VectorField::RthSub,
        VectorField::Rth,
        VectorField::RthLB,
        VectorField::MaxSolZen,
    ];

    pub const INTEGERS: [VectorField; 2] =
        [VectorField::TemporalProximity, VectorField::SpatialProximity];

    /// Raw reflectance bounds explored by delta perturbation.
    /// M10UB is left out: it sits at 1.0 and is effectively disabled.
    pub const RAW_REFLECTANCE: [VectorField; 5] = [
        VectorField::M07UB,
        VectorField::M08LB,
        VectorField::M08UB,
        VectorField::M10LB,
        VectorField::M11LB,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VectorField::M07UB => "M07UB",
            VectorField::M08LB => "M08LB",
            VectorField::M08UB => "M08UB",
            VectorField::M10LB => "M10LB",
            VectorField::M10UB => "M10UB",
            VectorField::M11LB => "M11LB",
            VectorField::RthSub => "RthSub",
            VectorField::Rth => "Rth",
            VectorField::RthLB => "RthLB",
            VectorField::MaxSolZen => "MaxSolZen",
            VectorField::TemporalProximity => "TemporalProximity",
            VectorField::SpatialProximity => "SpatialProximity",
        }
    }

    /// Case-insensitive lookup by field name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, VectorField::TemporalProximity | VectorField::SpatialProximity)
    }
}

impl std::fmt::Display for VectorField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The numeric, independently tunable subset of a run configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfigVector {
    /// Band 07 (0.86 um) upper bound
    #[serde(rename = "M07UB")]
    pub m07_ub: f64,
    /// Band 08 (1.24 um) lower bound
    #[serde(rename = "M08LB")]
    pub m08_lb: f64,
    /// Band 08 (1.24 um) upper bound
    #[serde(rename = "M08UB")]
    pub m08_ub: f64,
    /// Band 10 (1.61 um) lower bound
    #[serde(rename = "M10LB")]
    pub m10_lb: f64,
    /// Band 10 (1.61 um) upper bound
    #[serde(rename = "M10UB")]
    pub m10_ub: f64,
    /// Band 11 (2.25 um) lower bound
    #[serde(rename = "M11LB")]
    pub m11_lb: f64,
    /// Subtracted from band 08 before forming the ratio
    #[serde(rename = "RthSub")]
    pub rth_sub: f64,
    /// Exclusive upper bound of the band ratio
    #[serde(rename = "Rth")]
    pub rth: f64,
    /// Inclusive lower bound of the band ratio
    #[serde(rename = "RthLB")]
    pub rth_lb: f64,
    /// Maximum solar zenith angle for burned-area search (degrees)
    #[serde(rename = "MaxSolZen")]
    pub max_sol_zen: f64,
    /// Temporal proximity for event clustering (days)
    #[serde(rename = "TemporalProximity")]
    pub temporal_proximity: i64,
    /// Spatial proximity for event clustering (meters)
    #[serde(rename = "SpatialProximity")]
    pub spatial_proximity: i64,
}

impl ConfigVector {
    /// Value of a field as `f64`; integer fields convert exactly
    pub fn get(&self, field: VectorField) -> f64 {
        match field {
            VectorField::M07UB => self.m07_ub,
            VectorField::M08LB => self.m08_lb,
            VectorField::M08UB => self.m08_ub,
            VectorField::M10LB => self.m10_lb,
            VectorField::M10UB => self.m10_ub,
            VectorField::M11LB => self.m11_lb,
            VectorField::RthSub => self.rth_sub,
            VectorField::Rth => self.rth,
            VectorField::RthLB => self.rth_lb,
            VectorField::MaxSolZen => self.max_sol_zen,
            VectorField::TemporalProximity => self.temporal_proximity as f64,
            VectorField::SpatialProximity => self.spatial_proximity as f64,
        }
    }

    /// Set a field; integer fields round to the nearest whole number
    pub fn set(&mut self, field: VectorField, value: f64) {
        match field {
            VectorField::M07UB => self.m07_ub = value,
            VectorField::M08LB => self.m08_lb = value,
            VectorField::M08UB => self.m08_ub = value,
            VectorField::M10LB => self.m10_lb = value,
            VectorField::M10UB => self.m10_ub = value,
            VectorField::M11LB => self.m11_lb = value,
            VectorField::RthSub => self.rth_sub = value,
            VectorField::Rth => self.rth = value,
            VectorField::RthLB => self.rth_lb = value,
            VectorField::MaxSolZen => self.max_sol_zen = value,
            VectorField::TemporalProximity => self.temporal_proximity = value.round() as i64,
            VectorField::SpatialProximity => self.spatial_proximity = value.round() as i64,
        }
    }

    /// Copy of this vector with one field replaced
    pub fn with(mut self, field: VectorField, value: f64) -> Self {
        self.set(field, value);
        self
    }

    /// Flat view in canonical field order
    pub fn values(&self) -> [f64; 12] {
        VectorField::ALL.map(|field| self.get(field))
    }

    /// Canonical text form: `NAME=value;` per field in canonical order.
    ///
    /// Floats use the shortest representation that round-trips, so equal
    /// vectors always serialize identically.
    pub fn canonical_string(&self) -> String {
        VectorField::ALL
            .iter()
            .map(|&field| {
                if field.is_integer() {
                    format!("{}={};", field.name(), self.get(field) as i64)
                } else {
                    format!("{}={:?};", field.name(), self.get(field))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigVector {
        ConfigVector {
            m07_ub: 0.19,
            m08_lb: 0.11,
            m08_ub: 0.28,
            m10_lb: 0.07,
            m10_ub: 1.0,
            m11_lb: 0.05,
            rth_sub: 0.05,
            rth: 0.81,
            rth_lb: 0.0,
            max_sol_zen: 75.0,
            temporal_proximity: 5,
            spatial_proximity: 752,
        }
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in VectorField::ALL {
            assert_eq!(VectorField::from_name(field.name()), Some(field));
        }
        assert_eq!(VectorField::from_name("m07ub"), Some(VectorField::M07UB));
        assert_eq!(VectorField::from_name("M12UB"), None);
    }

    #[test]
    fn test_get_set_every_field() {
        let vector = sample();
        let mut shifted = vector;
        for field in VectorField::ALL {
            shifted.set(field, vector.get(field) + 1.0);
        }
        for field in VectorField::ALL {
            assert_eq!(shifted.get(field), vector.get(field) + 1.0);
        }
    }

    #[test]
    fn test_integer_fields_round() {
        let vector = sample().with(VectorField::SpatialProximity, 751.6);
        assert_eq!(vector.spatial_proximity, 752);
    }

    #[test]
    fn test_canonical_string_is_stable() {
        let a = sample();
        let b = sample();
        assert_eq!(a.canonical_string(), b.canonical_string());
        assert!(a.canonical_string().starts_with("M07UB=0.19;M08LB=0.11;"));
        assert!(a.canonical_string().ends_with("TemporalProximity=5;SpatialProximity=752;"));
        assert_ne!(a.canonical_string(), a.with(VectorField::Rth, 0.8).canonical_string());
    }
}
