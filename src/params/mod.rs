// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters for work. These are the validated, "ready-to-go" forms of what
//! the command line asks for; constructing one means the work can be done.

mod view;

pub(crate) use view::{Output, ViewError, ViewParams};
