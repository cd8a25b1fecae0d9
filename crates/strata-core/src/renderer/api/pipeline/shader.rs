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

//! Shader entry descriptors.

use crate::hash::{StructuralHash, StructuralHasher};
use crate::renderer::api::util::enums::ShaderStage;
use std::borrow::Cow;

/// An opaque handle to a compiled shader library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderModuleId(pub u64);

/// A specialization constant value for one entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecializationConstant {
    /// The constant id declared in the shader.
    pub constant_id: u32,
    /// The raw 64-bit value.
    pub value: u64,
}

/// Selects one entry point of a shader library for a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderEntryDescriptor<'a> {
    /// The library the entry lives in.
    pub module: ShaderModuleId,
    /// The entry-point function name.
    pub entry: Cow<'a, str>,
    /// The stage the entry is bound to.
    pub stage: ShaderStage,
    /// Specialization constants, in declaration order.
    pub constants: Cow<'a, [SpecializationConstant]>,
}

impl StructuralHash for ShaderEntryDescriptor<'_> {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        state.write_u64(self.module.0);
        state.write_str(&self.entry);
        state.write_u32(self.stage as u32);
        state.write_u64(self.constants.len() as u64);
        for constant in self.constants.iter() {
            state.write_u32(constant.constant_id);
            state.write_u64(constant.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_and_borrowed_entries_hash_equal() {
        let constants = [SpecializationConstant {
            constant_id: 0,
            value: 64,
        }];
        let borrowed = ShaderEntryDescriptor {
            module: ShaderModuleId(1),
            entry: Cow::Borrowed("cs_main"),
            stage: ShaderStage::Compute,
            constants: Cow::Borrowed(&constants),
        };
        let owned = ShaderEntryDescriptor {
            module: ShaderModuleId(1),
            entry: Cow::Owned("cs_main".to_string()),
            stage: ShaderStage::Compute,
            constants: Cow::Owned(constants.to_vec()),
        };
        assert_eq!(borrowed, owned);
        assert_eq!(borrowed.structural_digest(), owned.structural_digest());
    }

    #[test]
    fn constant_value_changes_hash() {
        let entry = |value| ShaderEntryDescriptor {
            module: ShaderModuleId(1),
            entry: Cow::Borrowed("main"),
            stage: ShaderStage::Fragment,
            constants: Cow::Owned(vec![SpecializationConstant {
                constant_id: 3,
                value,
            }]),
        };
        assert_ne!(entry(1).structural_digest(), entry(2).structural_digest());
    }
}
