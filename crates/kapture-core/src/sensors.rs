//! Sensor definitions and camera parameter models.
//!
//! Camera models follow the usual flat parameter layout
//! `[width, height, model params...]`, so that adapters can convert to and
//! from third-party tools without knowing the enum layout.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Real;

/// Identifier of a sensor (or a rig).
pub type SensorId = String;

/// Failure to interpret a flat camera parameter list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CameraParamsError {
    #[error("unknown camera model `{0}`")]
    UnknownModel(String),
    #[error("camera model `{model}` expects {expected} values, got {actual}")]
    WrongLength {
        model: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("image {dimension} must be a whole number of pixels, got {value}")]
    InvalidImageSize { dimension: &'static str, value: Real },
}

/// Intrinsic projection model of a camera.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraModel {
    /// Model not known; parameters are kept verbatim.
    UnknownCamera { params: Vec<Real> },
    SimplePinhole { f: Real, cx: Real, cy: Real },
    Pinhole { fx: Real, fy: Real, cx: Real, cy: Real },
    SimpleRadial { f: Real, cx: Real, cy: Real, k: Real },
    Radial { f: Real, cx: Real, cy: Real, k1: Real, k2: Real },
    /// Brown–Conrady with two radial and two tangential coefficients.
    Opencv {
        fx: Real,
        fy: Real,
        cx: Real,
        cy: Real,
        k1: Real,
        k2: Real,
        p1: Real,
        p2: Real,
    },
    /// OpenCV fisheye (equidistant) model.
    Fisheye {
        fx: Real,
        fy: Real,
        cx: Real,
        cy: Real,
        k1: Real,
        k2: Real,
        k3: Real,
        k4: Real,
    },
}

impl CameraModel {
    /// Conventional upper-case model name.
    pub fn name(&self) -> &'static str {
        match self {
            CameraModel::UnknownCamera { .. } => "UNKNOWN_CAMERA",
            CameraModel::SimplePinhole { .. } => "SIMPLE_PINHOLE",
            CameraModel::Pinhole { .. } => "PINHOLE",
            CameraModel::SimpleRadial { .. } => "SIMPLE_RADIAL",
            CameraModel::Radial { .. } => "RADIAL",
            CameraModel::Opencv { .. } => "OPENCV",
            CameraModel::Fisheye { .. } => "OPENCV_FISHEYE",
        }
    }

    /// Model parameters without image size, in conventional order.
    pub fn params(&self) -> Vec<Real> {
        match *self {
            CameraModel::UnknownCamera { ref params } => params.clone(),
            CameraModel::SimplePinhole { f, cx, cy } => vec![f, cx, cy],
            CameraModel::Pinhole { fx, fy, cx, cy } => vec![fx, fy, cx, cy],
            CameraModel::SimpleRadial { f, cx, cy, k } => vec![f, cx, cy, k],
            CameraModel::Radial { f, cx, cy, k1, k2 } => vec![f, cx, cy, k1, k2],
            CameraModel::Opencv {
                fx,
                fy,
                cx,
                cy,
                k1,
                k2,
                p1,
                p2,
            } => vec![fx, fy, cx, cy, k1, k2, p1, p2],
            CameraModel::Fisheye {
                fx,
                fy,
                cx,
                cy,
                k1,
                k2,
                k3,
                k4,
            } => vec![fx, fy, cx, cy, k1, k2, k3, k4],
        }
    }

    /// Parse a model from its name and parameters (image size excluded).
    pub fn from_params(name: &str, p: &[Real]) -> Result<Self, CameraParamsError> {
        let expect = |model: &'static str, n: usize| {
            if p.len() == n {
                Ok(())
            } else {
                Err(CameraParamsError::WrongLength {
                    model,
                    expected: n,
                    actual: p.len(),
                })
            }
        };
        let model = match name.to_ascii_uppercase().as_str() {
            "UNKNOWN_CAMERA" => CameraModel::UnknownCamera { params: p.to_vec() },
            "SIMPLE_PINHOLE" => {
                expect("SIMPLE_PINHOLE", 3)?;
                CameraModel::SimplePinhole {
                    f: p[0],
                    cx: p[1],
                    cy: p[2],
                }
            }
            "PINHOLE" => {
                expect("PINHOLE", 4)?;
                CameraModel::Pinhole {
                    fx: p[0],
                    fy: p[1],
                    cx: p[2],
                    cy: p[3],
                }
            }
            "SIMPLE_RADIAL" => {
                expect("SIMPLE_RADIAL", 4)?;
                CameraModel::SimpleRadial {
                    f: p[0],
                    cx: p[1],
                    cy: p[2],
                    k: p[3],
                }
            }
            "RADIAL" => {
                expect("RADIAL", 5)?;
                CameraModel::Radial {
                    f: p[0],
                    cx: p[1],
                    cy: p[2],
                    k1: p[3],
                    k2: p[4],
                }
            }
            "OPENCV" => {
                expect("OPENCV", 8)?;
                CameraModel::Opencv {
                    fx: p[0],
                    fy: p[1],
                    cx: p[2],
                    cy: p[3],
                    k1: p[4],
                    k2: p[5],
                    p1: p[6],
                    p2: p[7],
                }
            }
            "OPENCV_FISHEYE" => {
                expect("OPENCV_FISHEYE", 8)?;
                CameraModel::Fisheye {
                    fx: p[0],
                    fy: p[1],
                    cx: p[2],
                    cy: p[3],
                    k1: p[4],
                    k2: p[5],
                    k3: p[6],
                    k4: p[7],
                }
            }
            other => return Err(CameraParamsError::UnknownModel(other.to_string())),
        };
        Ok(model)
    }

    /// Focal lengths `(fx, fy)`, if the model defines them.
    pub fn focal_lengths(&self) -> Option<(Real, Real)> {
        match *self {
            CameraModel::UnknownCamera { .. } => None,
            CameraModel::SimplePinhole { f, .. }
            | CameraModel::SimpleRadial { f, .. }
            | CameraModel::Radial { f, .. } => Some((f, f)),
            CameraModel::Pinhole { fx, fy, .. }
            | CameraModel::Opencv { fx, fy, .. }
            | CameraModel::Fisheye { fx, fy, .. } => Some((fx, fy)),
        }
    }
}

/// Image size plus intrinsic model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraParams {
    pub width: u32,
    pub height: u32,
    pub model: CameraModel,
}

impl CameraParams {
    /// Parse the flat `[width, height, params...]` layout.
    pub fn from_flat(model_name: &str, flat: &[Real]) -> Result<Self, CameraParamsError> {
        if flat.len() < 2 {
            return Err(CameraParamsError::WrongLength {
                model: "image size",
                expected: 2,
                actual: flat.len(),
            });
        }
        Ok(Self {
            width: pixels("width", flat[0])?,
            height: pixels("height", flat[1])?,
            model: CameraModel::from_params(model_name, &flat[2..])?,
        })
    }

    /// Flatten to `[width, height, params...]`.
    pub fn to_flat(&self) -> Vec<Real> {
        let mut flat = vec![self.width as Real, self.height as Real];
        flat.extend(self.model.params());
        flat
    }
}

fn pixels(dimension: &'static str, value: Real) -> Result<u32, CameraParamsError> {
    if value.is_finite() && value.fract() == 0.0 && (0.0..=u32::MAX as Real).contains(&value) {
        Ok(value as u32)
    } else {
        Err(CameraParamsError::InvalidImageSize { dimension, value })
    }
}

/// What a sensor measures, together with its kind-specific parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorKind {
    Camera { params: CameraParams },
    Depth { params: CameraParams },
    Lidar,
    /// GNSS receiver; `epsg` names the coordinate reference system.
    Gnss { epsg: String },
    Wifi,
    Bluetooth,
    /// Anything else; parameters are opaque tokens.
    Other { type_name: String, params: Vec<String> },
}

impl SensorKind {
    /// Short lowercase name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            SensorKind::Camera { .. } => "camera",
            SensorKind::Depth { .. } => "depth",
            SensorKind::Lidar => "lidar",
            SensorKind::Gnss { .. } => "gnss",
            SensorKind::Wifi => "wifi",
            SensorKind::Bluetooth => "bluetooth",
            SensorKind::Other { .. } => "other",
        }
    }
}

/// A sensor definition.
///
/// `name` is descriptive only and is ignored by [`Sensor::same_definition`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: SensorKind,
}

impl Sensor {
    pub fn new(kind: SensorKind) -> Self {
        Self { name: None, kind }
    }

    pub fn camera(params: CameraParams) -> Self {
        Self::new(SensorKind::Camera { params })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Camera parameters, for camera and depth sensors.
    pub fn camera_params(&self) -> Option<&CameraParams> {
        match &self.kind {
            SensorKind::Camera { params } | SensorKind::Depth { params } => Some(params),
            _ => None,
        }
    }

    /// Whether two sensors describe the same device, ignoring descriptive fields.
    pub fn same_definition(&self, other: &Sensor) -> bool {
        self.kind == other.kind
    }
}
