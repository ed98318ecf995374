// End-to-end tests for the lesson pipeline.
//
// Every external service is stubbed (completion, speech and transcoding, see
// helpers::stubs) while checkpoints go to a real temporary directory, so the
// tests exercise the same file layout a real run produces.
//
// Each test receives its own output directory through the test-context
// lifecycle hooks, allowing tests to run in parallel.

mod helpers;
mod test_generation;
mod test_pipeline;
mod test_render;
