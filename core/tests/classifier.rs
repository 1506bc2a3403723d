use std::collections::{BTreeSet, VecDeque};

use rcli_core::{Classifier, ClassifierOptions, CliArgs, Scope, parse_args};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn scope_of(tokens: &[&str]) -> (CliArgs, Scope) {
    let queue: VecDeque<String> = tokens.iter().map(|s| s.to_string()).collect();
    Classifier::default().classify_with_scope("prog", queue)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn long_option_takes_following_plain_token() {
    let args = parse_args(["prog", "--verbose", "build", "--target=release", "main.c"]);

    assert_eq!(args.program, "prog");
    // no command yet, so everything up to main.c stays global
    assert_eq!(args.global_options.get("verbose"), Some("build"));
    assert_eq!(args.global_options.get("target"), Some("release"));
    assert!(args.global_flags.is_empty());
    assert_eq!(args.command, "main.c");
    assert!(args.local_options.is_empty());
}

#[test]
fn build_with_global_flags_and_local_option() {
    let args = parse_args(["prog", "-vq", "build", "--target=release", "main.c"]);

    assert_eq!(args.global_flags, set(&["q", "v"]));
    assert!(args.global_options.is_empty());
    assert_eq!(args.command, "build");
    assert_eq!(args.local_options.get("target"), Some("release"));
    assert!(args.local_flags.is_empty());
    // main.c is the first plain token after the command
    assert_eq!(args.subcommands, vec!["main.c"]);
    assert!(args.positionals.is_empty());
}

#[test]
fn build_with_subcommand_then_positional() {
    let args = parse_args([
        "prog",
        "--verbose",
        "-q",
        "build",
        "--target=release",
        "debug",
        "main.c",
    ]);

    assert!(args.global_flags.contains("verbose"));
    assert_eq!(args.global_options.get("q"), Some("build"));
    assert_eq!(args.command, "debug");
    assert_eq!(args.subcommands, vec!["main.c"]);

    let args = parse_args(["prog", "build", "--target=release", "debug", "main.c"]);
    assert_eq!(args.local_options.get("target"), Some("release"));
    assert_eq!(args.subcommands, vec!["debug"]);
    assert_eq!(args.positionals, vec!["main.c"]);
}

#[test]
fn combined_short_flags_stay_global() {
    let (args, scope) = scope_of(&["-abc"]);

    assert_eq!(args.global_flags, set(&["a", "b", "c"]));
    assert!(args.command.is_empty());
    assert_eq!(scope, Scope::Global);
}

#[test]
fn sigil_command_keeps_global_scope() {
    let (args, scope) = scope_of(&["@alias", "extra"]);

    assert_eq!(args.command, "@alias");
    assert_eq!(scope, Scope::Global);
    assert_eq!(args.subcommands, vec!["extra"]);
    assert!(args.global_flags.is_empty());
    assert!(args.global_options.is_empty());
}

#[test]
fn context_token_flips_scope_before_command() {
    let (args, scope) = scope_of(&["/ctx1", "--fast", "build"]);

    assert_eq!(args.context_args, vec!["/ctx1"]);
    // --fast is followed by a plain token, so it takes it as its value
    assert_eq!(args.local_options.get("fast"), Some("build"));
    assert!(args.command.is_empty());
    assert_eq!(scope, Scope::Local);

    let (args, scope) = scope_of(&["/ctx1", "build"]);
    assert_eq!(args.context_args, vec!["/ctx1"]);
    assert_eq!(args.command, "build");
    assert_eq!(scope, Scope::Local);
}

#[test]
fn all_context_prefixes_are_recognized() {
    let args = parse_args(["prog", "/a", "?#b", "?@c", "??d", "run"]);
    assert_eq!(args.context_args, vec!["/a", "?#b", "?@c", "??d"]);
    assert_eq!(args.command, "run");
}

#[test]
fn short_option_takes_value() {
    let args = parse_args(["prog", "-o", "out.bin", "link", "-j", "4"]);
    assert_eq!(args.global_options.get("o"), Some("out.bin"));
    assert_eq!(args.command, "link");
    assert_eq!(args.local_options.get("j"), Some("4"));
}

#[test]
fn malformed_option_falls_through_to_plain_rules() {
    let args = parse_args(["prog", "--=value", "--", "-1"]);
    assert_eq!(args.command, "--=value");
    assert_eq!(args.subcommands, vec!["--"]);
    assert_eq!(args.positionals, vec!["-1"]);
}

#[test]
fn empty_stream_yields_default_record() {
    let args = parse_args(["prog"]);
    assert_eq!(args, CliArgs::new("prog"));
}

#[test]
fn custom_context_prefixes() {
    let classifier = Classifier::new(ClassifierOptions {
        context_prefixes: vec!["+".into()],
        sigil_flips_scope: false,
    });
    let args = classifier.parse(["prog", "+env", "/not-context"]);
    assert_eq!(args.context_args, vec!["+env"]);
    assert_eq!(args.command, "/not-context");
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn program_is_first_token() {
    for argv in [
        vec!["tool"],
        vec!["tool", "--x=1"],
        vec!["tool", "@a", "b", "c"],
        vec!["tool", "/ctx", "-abc", "cmd"],
    ] {
        let args = parse_args(argv.clone());
        assert_eq!(args.program, argv[0]);
    }
}

#[test]
fn repeated_options_accumulate_in_order() {
    let args = parse_args(["prog", "--x=1", "--x=2", "--x=3"]);
    assert_eq!(args.global_options.get("x"), Some("1,2,3"));

    let args = parse_args(["prog", "run", "--tag", "a", "--tag=b", "-t", "c", "--tag", "d"]);
    assert_eq!(args.local_options.get("tag"), Some("a,b,d"));
    assert_eq!(args.local_options.get("t"), Some("c"));
}

#[test]
fn repeated_options_accumulate_per_scope() {
    let args = parse_args(["prog", "--env=a", "deploy", "--env=b", "--env=c"]);
    assert_eq!(args.global_options.get("env"), Some("a"));
    assert_eq!(args.local_options.get("env"), Some("b,c"));
}

#[test]
fn flags_are_idempotent() {
    let args = parse_args(["prog", "-v", "-v", "-v"]);
    assert_eq!(args.global_flags, set(&["v"]));

    let args = parse_args(["prog", "-vv", "--verbose", "--verbose"]);
    assert_eq!(args.global_flags, set(&["v", "verbose"]));
}

#[test]
fn scope_flip_is_monotonic() {
    // Once local, a later sigil command does not bring options back to global.
    let (args, scope) = scope_of(&["build", "@alias", "/ctx", "-a", "-b", "-c"]);
    assert_eq!(scope, Scope::Local);
    assert!(args.global_flags.is_empty());
    assert_eq!(args.local_flags, set(&["a", "b", "c"]));
    assert_eq!(args.command, "@alias");
}

#[test]
fn caller_argv_survives_parsing() {
    let argv = vec!["prog".to_string(), "build".to_string()];
    let args = parse_args(argv.clone());
    assert_eq!(argv, vec!["prog", "build"]);
    assert_eq!(args.command, "build");
}
