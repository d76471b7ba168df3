// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for operations on archive entities.

pub mod chats;
pub mod files;
pub mod messages;
pub mod search;
pub mod users;
