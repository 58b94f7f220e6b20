// SPDX-License-Identifier: Apache-2.0
// Copyright 2025-2026 Atrium Team
//! Atrium Access CLI
//!
//! A command-line interface for inspecting route rules and evaluating
//! access decisions against them.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use atrium_access::policy::AccessEvaluator;
use atrium_access::role::Role;

const HELP: &str = r#"
Atrium Access CLI

USAGE:
    atrium-access [OPTIONS] <COMMAND>

COMMANDS:
    eval        Evaluate a path (and optional role) against the rules
    check       Check that a rules file is valid
    repl        Start interactive REPL mode

OPTIONS:
    -r, --rules <FILE>    Path to route rules YAML file (default: built-in rules)
    -h, --help            Print help information
    -V, --version         Print version information

EXAMPLES:
    # Which role does a path require?
    atrium-access eval /admin/users

    # Would a member be allowed in?
    atrium-access eval -r rules.yaml /admin/users member

    # Check rules file syntax
    atrium-access check -r rules.yaml

    # Interactive REPL mode
    atrium-access repl -r rules.yaml
"#;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("{}", HELP);
        return ExitCode::FAILURE;
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => {
            println!("{}", HELP);
            ExitCode::SUCCESS
        }
        "-V" | "--version" | "version" => {
            println!("atrium-access {}", atrium_access::VERSION);
            ExitCode::SUCCESS
        }
        "eval" => run_eval(&args[2..]),
        "check" => run_check(&args[2..]),
        "repl" => run_repl(&args[2..]),
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            eprintln!("{}", HELP);
            ExitCode::FAILURE
        }
    }
}

fn parse_rules_arg(args: &[String]) -> Option<PathBuf> {
    for i in 0..args.len() {
        if (args[i] == "-r" || args[i] == "--rules") && i + 1 < args.len() {
            return Some(PathBuf::from(&args[i + 1]));
        }
    }
    None
}

/// Positional arguments, with the `-r FILE` pair filtered out.
fn positional_args(args: &[String]) -> Vec<&String> {
    let mut out = Vec::new();
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
            continue;
        }
        if arg == "-r" || arg == "--rules" {
            skip = true;
            continue;
        }
        out.push(arg);
    }
    out
}

fn load_evaluator(args: &[String]) -> Result<AccessEvaluator, String> {
    match parse_rules_arg(args) {
        Some(path) => {
            let yaml = fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read rules file: {}", e))?;
            AccessEvaluator::from_yaml(&yaml)
                .map_err(|e| format!("Failed to parse rules: {}", e))
        }
        None => Ok(AccessEvaluator::default()),
    }
}

fn print_decision(evaluator: &AccessEvaluator, path: &str, role: Option<Role>) {
    match evaluator.required_role(path) {
        None => println!("{}: unprotected", path),
        Some(required) => match role {
            None => println!("{}: requires {}", path, required),
            Some(actual) if actual.satisfies(required) => {
                println!("{}: ALLOW ({} >= {})", path, actual, required)
            }
            Some(actual) => println!("{}: DENY ({} < {})", path, actual, required),
        },
    }
}

fn run_eval(args: &[String]) -> ExitCode {
    let evaluator = match load_evaluator(args) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let positional = positional_args(args);
    let path = match positional.first() {
        Some(p) => p.as_str(),
        None => {
            eprintln!("Error: path argument required");
            return ExitCode::FAILURE;
        }
    };

    let role = match positional.get(1) {
        Some(s) => match Role::from_str(s) {
            Some(r) => Some(r),
            None => {
                eprintln!("Unknown role: {}", s);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    print_decision(&evaluator, path, role);

    let allowed = evaluator.authorize(role, path).is_allowed();
    if allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_check(args: &[String]) -> ExitCode {
    let rules_path = match parse_rules_arg(args) {
        Some(p) => p,
        None => {
            eprintln!("Error: --rules argument required");
            return ExitCode::FAILURE;
        }
    };

    let yaml = match fs::read_to_string(&rules_path) {
        Ok(y) => y,
        Err(e) => {
            eprintln!("Failed to read rules file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match AccessEvaluator::from_yaml(&yaml) {
        Ok(evaluator) => {
            println!("OK: Rules file is valid ({} rules)", evaluator.rule_count());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to parse rules: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_repl(args: &[String]) -> ExitCode {
    let evaluator = match load_evaluator(args) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Atrium Access REPL");
    println!("Loaded {} rules", evaluator.rule_count());
    println!("Enter 'PATH [ROLE]', or 'quit' to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush().unwrap();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() {
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == "quit" || line == "exit" {
            break;
        }

        let mut parts = line.split_whitespace();
        let path = parts.next().unwrap_or("");
        let role = match parts.next() {
            Some(s) => match Role::from_str(s) {
                Some(r) => Some(r),
                None => {
                    eprintln!("Unknown role: {}", s);
                    continue;
                }
            },
            None => None,
        };

        print_decision(&evaluator, path, role);
    }

    ExitCode::SUCCESS
}
