// Copyright 2025 Fernando Borretti
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

/// Dense position of a note in the model, starting at zero.
pub type NIndex = usize;

/// A Leitner box number, starting at one.
pub type BoxNumber = usize;

/// How many sessions pass between reviews of a box.
pub type Period = u64;

/// A Leitner session counter, starting at one.
pub type Session = u64;
