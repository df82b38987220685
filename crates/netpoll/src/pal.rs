// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Platform abstraction layer. Every syscall issued on a descriptor goes through [`Bindings`],
//! so unit tests can replace the operating system with mocks.

mod abstractions;
mod facade;
mod real;

pub use abstractions::*;
pub use facade::*;
pub use real::*;
