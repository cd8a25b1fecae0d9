// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the hierarchy of error types for the resource-layout subsystem.

use crate::renderer::api::command::DescriptorSetId;
use crate::renderer::api::pipeline::PipelineLayoutId;
use std::fmt;

/// An error related to the creation or pooling of a pipeline layout.
#[derive(Debug)]
pub enum PipelineError {
    /// The backend failed to create a pipeline layout.
    LayoutCreationFailed(String),
    /// A layout was used with an object built against a different layout.
    IncompatibleLayout {
        /// The layout the object was built against.
        expected: PipelineLayoutId,
        /// The layout that was supplied.
        found: PipelineLayoutId,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::LayoutCreationFailed(msg) => {
                write!(f, "Pipeline layout creation failed: {msg}")
            }
            PipelineError::IncompatibleLayout { expected, found } => {
                write!(
                    f,
                    "Incompatible pipeline layout: expected {expected:?}, found {found:?}"
                )
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// An error related to descriptor set allocation or updates.
#[derive(Debug)]
pub enum DescriptorError {
    /// The backend could not allocate a descriptor set for a table index.
    SetAllocationFailed {
        /// The set number inside the pipeline layout.
        set_index: u32,
        /// Detailed error message from the backend.
        details: String,
    },
    /// A descriptor set handle was not known to the backend.
    UnknownSet(DescriptorSetId),
    /// A descriptor set was requested for a set number the layout does not declare.
    SetIndexOutOfRange {
        /// The layout the set was requested for.
        layout: PipelineLayoutId,
        /// The requested set number.
        set_index: u32,
    },
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::SetAllocationFailed { set_index, details } => {
                write!(
                    f,
                    "Failed to allocate descriptor set for set index {set_index}: {details}"
                )
            }
            DescriptorError::UnknownSet(id) => write!(f, "Unknown descriptor set: {id:?}"),
            DescriptorError::SetIndexOutOfRange { layout, set_index } => {
                write!(
                    f,
                    "Set index {set_index} is not declared by pipeline layout {layout:?}"
                )
            }
        }
    }
}

impl std::error::Error for DescriptorError {}

/// An error related to the creation or use of a GPU object.
#[derive(Debug)]
pub enum ResourceError {
    /// A pipeline-specific error occurred.
    Pipeline(PipelineError),
    /// A descriptor-specific error occurred.
    Descriptor(DescriptorError),
    /// A generic resource could not be found.
    NotFound,
    /// The handle or ID used to reference a resource is invalid.
    InvalidHandle,
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
    /// An attempt was made to exceed a fixed-size limit (e.g. attachment slots).
    OutOfBounds,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Pipeline(err) => write!(f, "Pipeline resource error: {err}"),
            ResourceError::Descriptor(err) => write!(f, "Descriptor resource error: {err}"),
            ResourceError::NotFound => write!(f, "Resource not found with ID."),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
            ResourceError::OutOfBounds => write!(f, "Resource access out of bounds."),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Pipeline(err) => Some(err),
            ResourceError::Descriptor(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PipelineError> for ResourceError {
    fn from(err: PipelineError) -> Self {
        ResourceError::Pipeline(err)
    }
}

impl From<DescriptorError> for ResourceError {
    fn from(err: DescriptorError) -> Self {
        ResourceError::Descriptor(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn pipeline_error_display() {
        let err = PipelineError::LayoutCreationFailed("out of host memory".to_string());
        assert_eq!(
            format!("{err}"),
            "Pipeline layout creation failed: out of host memory"
        );

        let err = PipelineError::IncompatibleLayout {
            expected: PipelineLayoutId(1),
            found: PipelineLayoutId(2),
        };
        assert_eq!(
            format!("{err}"),
            "Incompatible pipeline layout: expected PipelineLayoutId(1), found PipelineLayoutId(2)"
        );
    }

    #[test]
    fn resource_error_display_wrapping_descriptor_error() {
        let err: ResourceError = DescriptorError::UnknownSet(DescriptorSetId(7)).into();
        assert_eq!(
            format!("{err}"),
            "Descriptor resource error: Unknown descriptor set: DescriptorSetId(7)"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn backend_error_has_no_source() {
        let err = ResourceError::BackendError("device lost".to_string());
        assert_eq!(
            format!("{err}"),
            "Backend-specific resource error: device lost"
        );
        assert!(err.source().is_none());
    }
}
