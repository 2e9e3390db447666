/*! Integration tests for canhoto.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * - auth: login checks and user creation against a real store
 * - receipt: capture, lookup and duplicate handling
 * - notify: e-mailing stored receipts through a recording transport
 * - store: schema setup and persistence across reopen
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("canhoto=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod auth;
mod helpers;
mod notify;
mod receipt;
mod store;
