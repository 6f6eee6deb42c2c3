// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! Pipe wiring
//!
//! Allocates one OS pipe and runs the `from` branch with its stdout bound
//! to the write end while the `to` branch reads the other end, both as
//! concurrently executing process trees. Endpoint ownership moves into
//! the branches; each end is consumed at spawn time, so once both
//! branches are under way the orchestrator holds no copy that could delay
//! EOF.

use crate::errors::{FlowError, FlowResult};
use crate::flow::Pipe;

use super::{Executor, ExitOutcome, StdinSource, StdoutSink};

/// Wire a pipe element: `from`'s stdout feeds `to`'s stdin, and `to`'s
/// stdout lands on the sink the caller supplied.
///
/// Both branches are always driven to completion, even when one of them
/// fails structurally before spawning anything: the failed branch drops
/// its pipe end, which surfaces in the surviving branch as EOF (reader)
/// or a broken pipe (writer), so nothing blocks forever and every
/// spawned process still gets reaped.
pub(crate) async fn wire<'a>(
    executor: &'a Executor<'a>,
    pipe: &'a Pipe,
    stdin: StdinSource,
    stdout: StdoutSink,
) -> FlowResult<ExitOutcome> {
    // References resolve lazily, at execution time.
    let from = executor.graph().resolve(&pipe.from)?;
    let to = executor.graph().resolve(&pipe.to)?;

    let (reader, writer) =
        std::io::pipe().map_err(|e| FlowError::PipeCreation { error: e.to_string() })?;

    tracing::debug!(pipe = %pipe.name, from = %pipe.from, to = %pipe.to, "wiring pipe");

    let (from_result, to_result) = tokio::join!(
        executor.execute(from, stdin, StdoutSink::Piped(writer)),
        executor.execute(to, StdinSource::Piped(reader), stdout),
    );

    let from_outcome = from_result?;
    let to_outcome = to_result?;

    Ok(from_outcome.and(to_outcome))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run_captured;
    use crate::errors::FlowError;
    use crate::exec::{Executor, StdinSource, StdoutSink};
    use crate::flow::FlowGraph;

    fn graph(text: &str) -> FlowGraph {
        FlowGraph::from_str(text).expect("flow must parse")
    }

    #[tokio::test]
    async fn test_bytes_arrive_in_order() {
        let flow = graph(
            "node=produce\n\
             command=printf 'one\\ntwo\\nthree\\n'\n\
             node=consume\n\
             command=cat\n\
             pipe=relay\n\
             from=produce\n\
             to=consume\n",
        );
        let (report, output) = run_captured(&flow, "relay").await;
        assert_eq!(output, "one\ntwo\nthree\n");
        assert!(report.outcome.success());
        assert_eq!(report.spawned, 2);
        assert!(report.balanced());
    }

    #[tokio::test]
    async fn test_reader_sees_all_input() {
        let flow = graph(
            "node=produce\n\
             command=printf 'a\\nb\\nc\\nd\\n'\n\
             node=count\n\
             command=wc -l\n\
             pipe=tally\n\
             from=produce\n\
             to=count\n",
        );
        let (_, output) = run_captured(&flow, "tally").await;
        assert_eq!(output.trim(), "4");
    }

    #[tokio::test]
    async fn test_chained_pipes() {
        let flow = graph(
            "node=produce\n\
             command=printf 'x y z\\n'\n\
             node=swap\n\
             command=tr 'a-z' 'A-Z'\n\
             node=gather\n\
             command=cat\n\
             pipe=upper\n\
             from=produce\n\
             to=swap\n\
             pipe=relay\n\
             from=upper\n\
             to=gather\n",
        );
        let (report, output) = run_captured(&flow, "relay").await;
        assert_eq!(output, "X Y Z\n");
        assert_eq!(report.spawned, 3);
        assert!(report.balanced());
    }

    #[tokio::test]
    async fn test_failing_writer_still_gives_reader_eof() {
        // The from branch cannot launch; the to branch must still
        // complete (on empty input) instead of hanging, and the overall
        // outcome must carry the failure.
        let flow = graph(
            "node=ghost\n\
             command=definitely-not-a-real-program-xyz\n\
             node=consume\n\
             command=cat\n\
             pipe=broken\n\
             from=ghost\n\
             to=consume\n",
        );
        let (report, output) = run_captured(&flow, "broken").await;
        assert!(output.is_empty());
        assert_eq!(report.outcome, crate::exec::ExitOutcome::Exited(127));
        assert!(report.balanced());
    }

    #[tokio::test]
    async fn test_dangling_reference_fails_at_run_time() {
        let flow = graph(
            "node=produce\ncommand=echo hi\npipe=dangling\nfrom=produce\nto=ghost\n",
        );
        let executor = Executor::new(&flow);
        let element = flow.resolve("dangling").unwrap();
        let err = executor
            .execute(element, StdinSource::Null, StdoutSink::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::ElementNotFound { .. }));
    }
}
