// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Zsh environment manager.
//!
//! dfctl generates a zsh run-control file from a declarative configuration
//! document, and manages the plugins and themes that file loads. Plugins and
//! themes are either cloned from remote repositories, or shipped with the
//! underlying shell framework.
//!
//! # Sources of Truth
//!
//! Only two things are ever trusted: the configuration file, and the
//! filesystem. Whether a plugin or theme is installed is read from disk, and
//! whether it is enabled is read from the configuration document, every time
//! the [`catalog`] is built. Nothing is cached across invocations.
//!
//! # Flow
//!
//! A command resolves a [`path::Layout`], opens a [`session::Session`] that
//! loads the configuration document through the [`store`], builds a
//! [`catalog::Catalog`] over it, and hands the catalog entries to the
//! [`sync`] orchestrator. The [`render`] module projects the document into
//! shell source text separately, without touching the catalog.

pub mod catalog;
pub mod config;
pub mod git;
pub mod installable;
pub mod path;
pub mod render;
pub mod session;
pub mod store;
pub mod sync;
pub mod updates;
pub mod urn;

#[cfg(test)]
mod testing;
