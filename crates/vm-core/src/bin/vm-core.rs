// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! A small demo CLI: builds a handful of classes through the minimal
//! front end, finalizes them, and exercises the heap, printing what it
//! did at each step (spec §6 "Disassembler, service/JSON, logging, CLI
//! flags — diagnostic only").

use clap::Parser;
use vm_core::class_table::ClassTable;
use vm_core::frontend::{simple_parameter, ClassBuilder, StubCodeGenerator};
use vm_core::object::{predefined, ObjectHeader, Value};
use vm_core::types::{ClassFinalizer, FunctionMetadata, NullInvalidationSink};

#[derive(Parser, Debug)]
#[command(name = "vm-core", about = "Demo driver for the VM core's class finalizer, heap and inliner")]
struct Args {
    /// Young-generation capacity, in slots.
    #[arg(long, default_value_t = 256)]
    young_size: usize,

    /// Old-generation capacity, in slots.
    #[arg(long, default_value_t = 1024)]
    old_size: usize,

    /// Number of demo allocations to push into the young space.
    #[arg(long, default_value_t = 8)]
    allocations: usize,

    /// Emit debug-level logging.
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    log::info!("building demo class hierarchy");
    let mut table = ClassTable::new();
    let base = {
        let mut builder = ClassBuilder::new(&mut table);
        let base = builder.new_class("Shape", 0);
        builder.add_function(base, FunctionMetadata::simple("area", vec![]));
        let circle = builder.new_class("Circle", 0);
        builder.add_super(circle, "Shape");
        builder.add_function(
            circle,
            FunctionMetadata::simple("area", vec![simple_parameter("radius", false)]),
        );
        base
    };

    match ClassFinalizer::finalize_pending_classes(&mut table, &mut NullInvalidationSink) {
        Ok(()) => log::info!("finalized {} classes", table.len()),
        Err(e) => {
            log::error!("class finalization failed: {e}");
            std::process::exit(1);
        }
    }
    log::debug!("'Shape' finalized as cid {}", base.as_u16());

    let generator = StubCodeGenerator::new();
    let code = generator.finalize_code("Circle.area", vec![0; 16]);
    log::info!("generated stub code with {} bytes", code.instructions.len());

    let mut isolate = vm_core::isolate::Isolate::new(args.young_size, args.old_size);
    for i in 0..args.allocations {
        let header = ObjectHeader::new(predefined::ARRAY, 1);
        let mut no_roots: [&mut Value; 0] = [];
        let handle = isolate.heap.allocate_young(header, 1, &mut no_roots);
        if let Some(obj) = handle {
            isolate.heap.write_field(obj, 0, Value::Smi(i as i64));
        }
        log::debug!("allocated young object #{i}: {handle:?}");
    }
    log::info!("heap now holds allocations from this run; demo complete");
}
