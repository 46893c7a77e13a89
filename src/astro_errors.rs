use thiserror::Error;

use crate::{constants::BodyId, rotation::RotationOrder};

#[derive(Error, Debug)]
pub enum AstroError {
    #[error("Invalid shape: expected {expected}, found {found}")]
    InvalidShape { expected: String, found: String },

    #[error("Zero norm for rotation axis")]
    ZeroNormAxis,

    #[error("Not a rotation matrix (negative determinant after orthogonalization)")]
    NotARotationMatrix,

    #[error("Matrix is singular and cannot be orthogonalized")]
    SingularMatrix,

    #[error("Invalid rotation convention: {0} (expected 'vector' or 'frame')")]
    InvalidConvention(String),

    #[error("Invalid rotation order: {0}")]
    InvalidRotationOrder(String),

    #[error("Euler angles singularity (gimbal lock) for rotation order {0}")]
    GimbalLock(RotationOrder),

    #[error("Frame {0} has no parent")]
    FrameHasNoParent(String),

    #[error("Frames {0} and {1} do not belong to the same frame tree")]
    UnrelatedFrames(String, String),

    #[error("Frame not found: {0}")]
    FrameNotFound(String),

    #[error("A frame named {0} already exists in this frame tree")]
    DuplicateFrameName(String),

    #[error("Factory not registered with this FrameProxy")]
    FactoryNotRegistered,

    #[error("This FrameProxy already has a registered factory")]
    FactoryAlreadyRegistered,

    #[error("Unknown pair ({0}, {1})")]
    UnknownPair(BodyId, BodyId),

    #[error("No segment between {0} and {1} in the loaded kernel")]
    UnknownSegment(BodyId, BodyId),

    #[error("Invalid ephemeris source: {0}")]
    InvalidEphemerisSource(String),

    #[error("Ephemeris kernel not found at: {0}")]
    KernelNotFound(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Error during the nom parsing: {0}")]
    NomParsingError(String),

    #[error("Invalid SPK data type: {0}")]
    InvalidSpkDataType(i32),

    #[error("Epoch {et} (ET seconds) outside of segment coverage for target {target}, center {center}")]
    EpochOutOfRange {
        target: BodyId,
        center: BodyId,
        et: f64,
    },
}

impl<E: std::fmt::Debug> From<nom::Err<E>> for AstroError {
    fn from(err: nom::Err<E>) -> Self {
        AstroError::NomParsingError(format!("{err:?}"))
    }
}

impl Clone for AstroError {
    fn clone(&self) -> Self {
        use AstroError::*;
        match self {
            InvalidShape { expected, found } => InvalidShape {
                expected: expected.clone(),
                found: found.clone(),
            },
            ZeroNormAxis => ZeroNormAxis,
            NotARotationMatrix => NotARotationMatrix,
            SingularMatrix => SingularMatrix,
            InvalidConvention(s) => InvalidConvention(s.clone()),
            InvalidRotationOrder(s) => InvalidRotationOrder(s.clone()),
            GimbalLock(order) => GimbalLock(*order),
            FrameHasNoParent(s) => FrameHasNoParent(s.clone()),
            UnrelatedFrames(a, b) => UnrelatedFrames(a.clone(), b.clone()),
            FrameNotFound(s) => FrameNotFound(s.clone()),
            DuplicateFrameName(s) => DuplicateFrameName(s.clone()),
            FactoryNotRegistered => FactoryNotRegistered,
            FactoryAlreadyRegistered => FactoryAlreadyRegistered,
            UnknownPair(a, b) => UnknownPair(*a, *b),
            UnknownSegment(a, b) => UnknownSegment(*a, *b),
            InvalidEphemerisSource(s) => InvalidEphemerisSource(s.clone()),
            KernelNotFound(s) => KernelNotFound(s.clone()),
            // io::Error is not Clone: keep its kind and message
            IoError(err) => IoError(std::io::Error::new(err.kind(), err.to_string())),
            NomParsingError(s) => NomParsingError(s.clone()),
            InvalidSpkDataType(t) => InvalidSpkDataType(*t),
            EpochOutOfRange { target, center, et } => EpochOutOfRange {
                target: *target,
                center: *center,
                et: *et,
            },
        }
    }
}

impl PartialEq for AstroError {
    fn eq(&self, other: &Self) -> bool {
        use AstroError::*;
        match (self, other) {
            (
                InvalidShape {
                    expected: e1,
                    found: f1,
                },
                InvalidShape {
                    expected: e2,
                    found: f2,
                },
            ) => e1 == e2 && f1 == f2,
            (InvalidConvention(a), InvalidConvention(b)) => a == b,
            (InvalidRotationOrder(a), InvalidRotationOrder(b)) => a == b,
            (GimbalLock(a), GimbalLock(b)) => a == b,
            (FrameHasNoParent(a), FrameHasNoParent(b)) => a == b,
            (UnrelatedFrames(a1, b1), UnrelatedFrames(a2, b2)) => a1 == a2 && b1 == b2,
            (FrameNotFound(a), FrameNotFound(b)) => a == b,
            (DuplicateFrameName(a), DuplicateFrameName(b)) => a == b,
            (UnknownPair(a1, b1), UnknownPair(a2, b2)) => a1 == a2 && b1 == b2,
            (UnknownSegment(a1, b1), UnknownSegment(a2, b2)) => a1 == a2 && b1 == b2,
            (InvalidEphemerisSource(a), InvalidEphemerisSource(b)) => a == b,
            (KernelNotFound(a), KernelNotFound(b)) => a == b,
            (NomParsingError(a), NomParsingError(b)) => a == b,
            (InvalidSpkDataType(a), InvalidSpkDataType(b)) => a == b,
            (
                EpochOutOfRange {
                    target: t1,
                    center: c1,
                    et: e1,
                },
                EpochOutOfRange {
                    target: t2,
                    center: c2,
                    et: e2,
                },
            ) => t1 == t2 && c1 == c2 && e1 == e2,

            // I/O errors are not comparable: equal when same variant
            (IoError(_), IoError(_)) => true,

            (ZeroNormAxis, ZeroNormAxis) => true,
            (NotARotationMatrix, NotARotationMatrix) => true,
            (SingularMatrix, SingularMatrix) => true,
            (FactoryNotRegistered, FactoryNotRegistered) => true,
            (FactoryAlreadyRegistered, FactoryAlreadyRegistered) => true,

            _ => false,
        }
    }
}
