//! Lowers recognized statements to x86 assembly.
//!
//! Each handler gets the line it was recognized on and returns the line to
//! continue at. Handlers that open a block compile the body in place through
//! [`Env::block`] and return one past its `}`.

use super::ast::{Condition, Stmt};
use super::env::{Env, is_terminator};
use crate::error::{CompileResult, ErrorKind};
use crate::model::{LoopCheck, Marshal, Param, Variable, Width};

pub fn lower(env: &mut Env, stmt: Stmt, at: usize) -> CompileResult<usize> {
    match stmt {
        Stmt::Assign { width, name, value } => assign(env, width, name, value, at),
        Stmt::Call { name, args } => call(env, &name, &args, at),
        Stmt::If { condition } => if_block(env, &condition, at),
        Stmt::Asm => asm_block(env, at),
        Stmt::While { condition } => while_loop(env, &condition, at),
        Stmt::For { var, min, max } => for_loop(env, &var, &min, &max, at),
        Stmt::Goto { target } => goto(env, &target, at),
        Stmt::Define { name, params } => define(env, name, params, at),
    }
}

fn assign(
    env: &mut Env,
    width: Option<Width>,
    name: String,
    value: String,
    at: usize,
) -> CompileResult<usize> {
    let width = match width {
        Some(width) => width,
        None => env.width_of(&name, at)?,
    };

    // x86 has no memory-to-memory mov: stage a variable source in the
    // accumulator of its own width.
    let value = match env.vars.get(&value).map(|src| src.width) {
        Some(src_width) => env.load(&value, src_width),
        None => value,
    };

    let var = Variable { width, value };
    if !var.is_string() {
        env.out.emit(format!("mov {width} [{name}], {}", var.value));
    }
    env.vars.insert(name, var);
    Ok(at + 1)
}

fn call(env: &mut Env, name: &str, args: &[String], at: usize) -> CompileResult<usize> {
    let args: Vec<String> = args.iter().map(|arg| env.operand(arg)).collect();

    let Some(params) = env.funcs.get(name).cloned() else {
        // Not a function: the call is a single instruction.
        if args.is_empty() {
            env.out.emit(name);
        } else {
            env.out.emit(format!("{name} {}", args.join(", ")));
        }
        return Ok(at + 1);
    };

    if params.len() != args.len() {
        return Err(env.error(
            at,
            ErrorKind::ArityMismatch {
                name: name.to_string(),
                expected: params.len(),
                found: args.len(),
            },
        ));
    }

    let last = params.last().map(|p| p.width);
    for (arg, param) in args.iter().zip(&params) {
        let width = match env.options.marshal {
            Marshal::LastParam => last.unwrap_or(param.width),
            Marshal::PerParam => param.width,
        };
        let reg = width.register();
        env.out.emit(format!("mov {reg}, {arg}"));
        env.out.emit(format!("mov [{}], {reg}", param.name));
    }
    env.out.emit(format!("call {name}"));
    Ok(at + 1)
}

/// Emits `cmp` for `condition`. A variable on the right is loaded into the
/// accumulator matching the left operand's width.
fn compare(env: &mut Env, condition: &Condition) {
    let lhs = env.sized_operand(&condition.lhs);
    let width = env
        .vars
        .get(&condition.lhs)
        .or_else(|| env.vars.get(&condition.rhs))
        .map(|var| var.width);
    let rhs = match width {
        Some(width) => env.load(&condition.rhs, width),
        None => condition.rhs.clone(),
    };
    env.out.emit(format!("cmp {lhs}, {rhs}"));
}

fn if_block(env: &mut Env, condition: &Condition, at: usize) -> CompileResult<usize> {
    let label = format!("i{}", env.next_if());

    compare(env, condition);
    env.out.emit(format!("{} {label}", condition.op.jump()));
    env.out.emit(format!("jmp {label}e"));
    env.out.emit(format!("{label}:"));

    env.out.indent();
    let next = env.block(at)?;
    env.out.dedent();

    env.out.emit(format!("{label}e:"));
    env.out.emit_nested("nop");
    Ok(next)
}

fn asm_block(env: &mut Env, at: usize) -> CompileResult<usize> {
    let mut cursor = at + 1;
    loop {
        let line = env
            .line(cursor)
            .ok_or_else(|| env.error(at, ErrorKind::UnterminatedBlock))?;
        if is_terminator(line) {
            return Ok(cursor + 1);
        }
        // lines holding a stray `}` are dropped rather than copied
        if !line.contains('}') {
            let line = line.trim().to_string();
            env.out.emit(line);
        }
        cursor += 1;
    }
}

fn while_loop(env: &mut Env, condition: &Condition, at: usize) -> CompileResult<usize> {
    let label = format!("w{}", env.next_loop());
    let pre_test = env.options.loops == LoopCheck::PreTest;

    if pre_test {
        env.out.emit(format!("jmp {label}c"));
    }
    env.out.emit(format!("{label}:"));

    env.out.indent();
    let next = env.block(at)?;
    if pre_test {
        env.out.dedent();
        env.out.emit(format!("{label}c:"));
        env.out.indent();
    }
    compare(env, condition);
    env.out.emit(format!("{} {label}", condition.op.jump()));
    env.out.dedent();
    Ok(next)
}

fn for_loop(env: &mut Env, var: &str, min: &str, max: &str, at: usize) -> CompileResult<usize> {
    let width = env.width_of(var, at)?;
    let counter = format!("{width} [{var}]");
    let label = format!("f{}", env.next_loop());
    let pre_test = env.options.loops == LoopCheck::PreTest;

    let min = env.load(min, width);
    env.out.emit(format!("mov {counter}, {min}"));
    if pre_test {
        env.out.emit(format!("jmp {label}c"));
    }
    env.out.emit(format!("{label}:"));

    env.out.indent();
    let next = env.block(at)?;
    env.out.emit(format!("inc {counter}"));
    if pre_test {
        env.out.dedent();
        env.out.emit(format!("{label}c:"));
        env.out.indent();
    }
    let max = env.load(max, width);
    env.out.emit(format!("cmp {counter}, {max}"));
    env.out.emit(format!("jl {label}"));
    env.out.dedent();
    Ok(next)
}

/// Parses a line number written in decimal, `0x` hex or `0b` binary.
fn line_number(text: &str) -> Option<usize> {
    if let Some(hex) = text.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = text.strip_prefix("0b") {
        usize::from_str_radix(bin, 2).ok()
    } else {
        text.parse().ok()
    }
}

fn goto(env: &mut Env, target: &str, at: usize) -> CompileResult<usize> {
    let target = match env.vars.get(target) {
        Some(var) => var.value.clone(),
        None => target.to_string(),
    };
    match line_number(&target) {
        Some(line) if line < env.line_count() => Ok(line),
        _ => Err(env.error(
            at,
            ErrorKind::InvalidGotoTarget {
                target,
                lines: env.line_count(),
            },
        )),
    }
}

fn define(env: &mut Env, name: String, params: Vec<Param>, at: usize) -> CompileResult<usize> {
    for param in &params {
        env.vars.insert(
            param.name.clone(),
            Variable {
                width: param.width,
                value: "0".into(),
            },
        );
    }
    env.out.emit(format!("jmp e{name}"));
    env.out.emit(format!("{name}:"));
    env.funcs.insert(name.clone(), params);

    env.out.indent();
    let next = env.block(at)?;
    env.out.emit("ret");
    env.out.dedent();

    env.out.emit(format!("e{name}:"));
    env.out.emit_nested("nop");
    Ok(next)
}
