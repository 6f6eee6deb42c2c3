// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! Sequential concatenation
//!
//! Runs a concatenate's parts strictly in listed order: part *i+1* does
//! not start until part *i* has fully terminated. Every part writes to a
//! duplicate of the same downstream sink, and the runner's own duplicate
//! is released only after the last part, so the stream observed
//! downstream is each part's full output in order, with exactly one EOF
//! at the end — never interleaving.

use crate::errors::{FlowError, FlowResult};
use crate::flow::Concatenate;

use super::{Executor, ExitOutcome, StdinSource, StdoutSink};

/// Execute the parts of a concatenate in strict order.
///
/// A part that fails — structurally (unresolvable or ambiguous name,
/// empty command) or with a non-zero exit — does not prevent the
/// remaining parts from running. After all parts have run, the first
/// structural error is surfaced if there was one, otherwise the first
/// failing part's outcome. Resource errors abort immediately.
pub(crate) async fn run_sequential(
    executor: &Executor<'_>,
    concat: &Concatenate,
    stdin: StdinSource,
    stdout: StdoutSink,
) -> FlowResult<ExitOutcome> {
    let mut overall = ExitOutcome::SUCCESS;
    let mut first_structural: Option<FlowError> = None;

    for part_name in &concat.parts {
        let part_result = match executor.graph().resolve(part_name) {
            Ok(element) => {
                let part_stdin = stdin.try_clone()?;
                let part_stdout = stdout.try_clone()?;
                executor.execute(element, part_stdin, part_stdout).await
            }
            Err(e) => Err(e),
        };

        match part_result {
            Ok(outcome) => {
                if !outcome.success() {
                    tracing::warn!(
                        concatenate = %concat.name,
                        part = %part_name,
                        %outcome,
                        "part failed; continuing with remaining parts"
                    );
                }
                overall = overall.and(outcome);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    concatenate = %concat.name,
                    part = %part_name,
                    error = %e,
                    "part unusable; continuing with remaining parts"
                );
                if first_structural.is_none() {
                    first_structural = Some(e);
                }
            }
        }
    }

    // The runner's duplicate of the sink closes only now, after every
    // part has finished: downstream EOF happens exactly once.
    drop(stdout);

    match first_structural {
        Some(e) => Err(e),
        None => Ok(overall),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run_captured;
    use crate::errors::FlowError;
    use crate::exec::{Executor, ExitOutcome, StdinSource, StdoutSink};
    use crate::flow::FlowGraph;

    fn graph(text: &str) -> FlowGraph {
        FlowGraph::from_str(text).expect("flow must parse")
    }

    #[tokio::test]
    async fn test_parts_never_interleave() {
        let flow = graph(
            "node=first\n\
             command=echo foo\n\
             node=second\n\
             command=echo bar\n\
             concatenate=both\n\
             parts=2\n\
             part_0=first\n\
             part_1=second\n",
        );
        let (report, output) = run_captured(&flow, "both").await;
        assert_eq!(output, "foo\nbar\n");
        assert!(report.outcome.success());
        assert_eq!(report.spawned, 2);
        assert!(report.balanced());
    }

    #[tokio::test]
    async fn test_listed_order_beats_speed() {
        // The slower first part must still come out first.
        let flow = graph(
            "node=slow\n\
             command=sh -c 'sleep 0.2; echo slow'\n\
             node=fast\n\
             command=echo fast\n\
             concatenate=ordered\n\
             parts=2\n\
             part_0=slow\n\
             part_1=fast\n",
        );
        let (_, output) = run_captured(&flow, "ordered").await;
        assert_eq!(output, "slow\nfast\n");
    }

    #[tokio::test]
    async fn test_failed_part_does_not_stop_the_rest() {
        let flow = graph(
            "node=a\n\
             command=echo before\n\
             node=boom\n\
             command=sh -c 'exit 9'\n\
             node=b\n\
             command=echo after\n\
             concatenate=run\n\
             parts=3\n\
             part_0=a\n\
             part_1=boom\n\
             part_2=b\n",
        );
        let (report, output) = run_captured(&flow, "run").await;
        assert_eq!(output, "before\nafter\n");
        assert_eq!(report.outcome, ExitOutcome::Exited(9));
        assert_eq!(report.spawned, 3);
        assert!(report.balanced());
    }

    #[tokio::test]
    async fn test_unresolvable_part_surfaces_after_all_parts_ran() {
        let flow = graph(
            "node=a\ncommand=echo one\nnode=b\ncommand=echo two\n\
             concatenate=mixed\nparts=3\npart_0=a\npart_1=ghost\npart_2=b\n",
        );
        let executor = Executor::new(&flow);
        let element = flow.resolve("mixed").unwrap();

        let (mut reader, writer) = std::io::pipe().unwrap();
        let collect = tokio::task::spawn_blocking(move || {
            use std::io::Read;
            let mut buf = String::new();
            reader.read_to_string(&mut buf).unwrap();
            buf
        });

        let err = executor
            .execute(element, StdinSource::Null, StdoutSink::Piped(writer))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::ElementNotFound { .. }));

        // Both resolvable siblings still ran, in order.
        assert_eq!(collect.await.unwrap(), "one\ntwo\n");
    }

    #[tokio::test]
    async fn test_nested_concatenate() {
        let flow = graph(
            "node=a\ncommand=echo a\nnode=b\ncommand=echo b\nnode=c\ncommand=echo c\n\
             concatenate=inner\nparts=2\npart_0=a\npart_1=b\n\
             concatenate=outer\nparts=2\npart_0=inner\npart_1=c\n",
        );
        let (report, output) = run_captured(&flow, "outer").await;
        assert_eq!(output, "a\nb\nc\n");
        assert_eq!(report.spawned, 3);
        assert!(report.balanced());
    }

    #[tokio::test]
    async fn test_pipe_as_part() {
        let flow = graph(
            "node=head\ncommand=echo leading\n\
             node=produce\ncommand=printf 'x\\ny\\n'\n\
             node=count\ncommand=wc -l\n\
             pipe=tally\nfrom=produce\nto=count\n\
             concatenate=summary\nparts=2\npart_0=head\npart_1=tally\n",
        );
        let (report, output) = run_captured(&flow, "summary").await;
        assert_eq!(output.lines().next(), Some("leading"));
        assert_eq!(output.lines().nth(1).map(str::trim), Some("2"));
        assert_eq!(report.spawned, 3);
        assert!(report.balanced());
    }
}
