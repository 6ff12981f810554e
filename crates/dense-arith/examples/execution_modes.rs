// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Example: the four execution modes side by side.
//!
//! Runs one operation through each path, shows which tensor holds the
//! result, and prints pool and dispatch statistics.
//!
//! ```bash
//! RUST_LOG=debug cargo run -p dense-arith --example execution_modes
//! ```

use dense_arith::{use_unsafe, with_incr, with_reuse, Arith, ArithConfig};
use tensor_core::{DType, Shape, Tensor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ArithConfig {
        memory_budget: "16M".into(),
        ..Default::default()
    };
    let arith = Arith::new(&config)?;

    let shape = Shape::matrix(2, 3);
    let a = Tensor::from_f32(shape.clone(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
    let b = Tensor::from_f32(shape.clone(), &[10.0; 6])?;

    println!("a = {:?}", a.to_vec::<f32>());
    println!("b = {:?}\n", b.to_vec::<f32>());

    // Fresh: a new tensor, inputs untouched.
    let fresh = arith.mul(&a, &b, &[])?;
    println!("{:<28} {:?}", "fresh     a * b", fresh.to_vec::<f32>());

    // Reuse: written into a caller-owned buffer.
    let out = Tensor::zeros(shape.clone(), DType::F32);
    arith.sub(&b, &a, &[with_reuse(&out)])?;
    println!("{:<28} {:?}", "reuse     out = b - a", out.to_vec::<f32>());

    // Increment: accumulated into the same buffer.
    arith.add_scalar(&a, 0.5f32, &[with_incr(&out)])?;
    println!("{:<28} {:?}", "increment out += a + 0.5", out.to_vec::<f32>());

    // Increment into an operand reads the operand's original values.
    let acc = b.deep_copy();
    arith.div(&a, &acc, &[with_incr(&acc)])?;
    println!("{:<28} {:?}", "increment b' += a / b'", acc.to_vec::<f32>());

    // In-place: the tensor operand is overwritten and returned.
    let same = arith.scalar_pow(2.0f32, &a, &[use_unsafe()])?;
    println!("{:<28} {:?}", "in-place  a = 2 ^ a", same.to_vec::<f32>());
    println!("{:<28} {}\n", "  returned handle is a", same.same(&a));

    // A failure names the operation, call shape and path.
    let ints = Tensor::from_vec(Shape::vector(3), vec![4i32, 5, 6])?;
    if let Err(e) = arith.div_scalar(&ints, 0i32, &[use_unsafe()]) {
        println!("error: {e}");
        println!("ints unchanged: {:?}\n", ints.to_vec::<i32>());
    }

    drop(fresh);
    let _again = arith.mul(&a, &b, &[])?;

    println!("Dispatch: {}", arith.stats().summary());
    if let Some(pool) = arith.pool() {
        println!("Pool: {}", pool.stats().summary());
    }

    Ok(())
}
