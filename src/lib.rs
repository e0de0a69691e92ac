// Library root
// -----------
// This crate exposes the pieces the `cm-sync` binary composes to copy
// chart versions from one ChartMuseum server to another.
//
// Module responsibilities:
// - `app`: The probe -> plan -> transfer sequence the binary runs.
// - `api`: Encapsulates HTTP interactions with a ChartMuseum server
//   (info probe, chart listing, archive download and upload).
// - `index`: Chart index data model and the source -> destination diff.
// - `sync`: Plans and runs the transfer loop, reporting progress.
// - `error`: Typed errors shared by the modules above.
// - `config`: Command line arguments and endpoint resolution.
// - `logging`: tracing subscriber setup.
// - `ui`: Terminal output: usage text, progress bar, plan and summary.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod index;
pub mod logging;
pub mod sync;
pub mod ui;
