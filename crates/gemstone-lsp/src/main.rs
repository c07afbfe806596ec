// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! GemStone Smalltalk Language Server Protocol server.
//!
//! **DDD Context:** Language Service
//!
//! This binary exposes the `AnalysisSession` from `gemstone-core` over the
//! Language Server Protocol using `tower-lsp`.

/// LSP and core type conversions.
mod convert;
/// `gemstone/*` request and response types.
mod protocol;
/// LSP server backend implementation.
mod server;
/// Workspace scanning for initial indexing.
mod workspace;

use clap::{ArgAction, Parser};
use tower_lsp::{LspService, Server};
use tracing_subscriber::{self, EnvFilter};

/// Entry point for the GemStone language server.
///
/// Initialises tracing, creates the LSP service, and serves over stdin/stdout.
#[derive(Debug, Parser)]
#[command(name = "gemstone-lsp", about = "GemStone Smalltalk Language Server", version)]
struct Cli {
    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let default_directive = directive_for_verbosity(cli.verbose);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        // stdout carries the protocol; logs go to stderr as plain text.
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(server::Backend::new)
        .custom_method(
            "gemstone/selectorAtPosition",
            server::Backend::selector_at_position,
        )
        .custom_method("gemstone/searchMethods", server::Backend::search_methods)
        .custom_method("gemstone/senders", server::Backend::senders)
        .custom_method("gemstone/implementors", server::Backend::implementors)
        .custom_method("gemstone/indexFile", server::Backend::index_file)
        .custom_method("gemstone/removeFile", server::Backend::remove_file)
        .finish();
    Server::new(stdin, stdout, socket).serve(service).await;
}

fn directive_for_verbosity(v: u8) -> &'static str {
    // Targets are crate module paths: `gemstone_lsp`, not `gemstone`.
    match v {
        0 => "gemstone_lsp=info,gemstone_core=info,tower_lsp=warn",
        1 => "gemstone_lsp=debug,gemstone_core=debug,tower_lsp=info",
        _ => "gemstone_lsp=trace,gemstone_core=trace,tower_lsp=debug",
    }
}
