use petcheck_core::{ApiRequest, Expectations, Report};

use super::{Ctx, Scenario, ScenarioError, setup_request};
use crate::fixtures::{self, Order};

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "get inventory",
        run: get_inventory,
    },
    Scenario {
        name: "place order",
        run: place_order,
    },
    Scenario {
        name: "get order by id",
        run: get_order,
    },
    Scenario {
        name: "place invalid order",
        run: place_invalid_order,
    },
    Scenario {
        name: "delete order",
        run: delete_order,
    },
    Scenario {
        name: "get missing order",
        run: get_missing_order,
    },
];

/// Any pet id works for an order; the server does not check it exists.
fn pet_id(ctx: &mut Ctx<'_>) -> i64 {
    match &ctx.pet {
        Some(pet) => pet.id,
        None => fixtures::pet(&mut ctx.rng).id,
    }
}

fn ensure_order(ctx: &mut Ctx<'_>) -> Result<Order, ScenarioError> {
    if let Some(order) = &ctx.order {
        return Ok(order.clone());
    }
    let pet_id = pet_id(ctx);
    let order = fixtures::order(&mut ctx.rng, pet_id);
    setup_request(ctx, &ApiRequest::post("/store/order", fixtures::to_json(&order)?))?;
    ctx.order = Some(order.clone());
    Ok(order)
}

fn get_inventory(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let response = ctx.send(&ApiRequest::get("/store/inventory"))?;
    let expect = Expectations::new()
        .status(200)
        .expect_headers(["application/json"]);
    ctx.check(&response, &expect, "/store/inventory", "GET", false)
}

fn place_order(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let pet_id = pet_id(ctx);
    let order = fixtures::order(&mut ctx.rng, pet_id);
    let response = ctx.send(&ApiRequest::post("/store/order", fixtures::to_json(&order)?))?;
    let expect = Expectations::new()
        .status(200)
        .expect_json([
            format!("\"id\":{}", order.id),
            format!("\"petId\":{pet_id}"),
            format!("\"quantity\":{}", order.quantity),
            format!("\"complete\":{}", order.complete),
        ]);
    let report = ctx.check(&response, &expect, "/store/order", "POST", true)?;
    if response.status_code == 200 {
        ctx.order = Some(order);
    }
    Ok(report)
}

fn get_order(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let order = ensure_order(ctx)?;
    let response = ctx.send(&ApiRequest::get(format!("/store/order/{}", order.id)))?;
    let expect = Expectations::new()
        .status(200)
        .expect_json([
            format!("\"id\":{}", order.id),
            format!("\"petId\":{}", order.pet_id),
        ]);
    ctx.check(&response, &expect, "/store/order/{orderId}", "GET", true)
}

fn place_invalid_order(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let pet_id = pet_id(ctx);
    let body = fixtures::invalid_order(&mut ctx.rng, pet_id);
    let response = ctx.send(&ApiRequest::post("/store/order", body))?;
    let expect = Expectations::new()
        .status(500)
        .expect_json(["something bad happened"]);
    Ok(ctx.verify(&response, &expect))
}

fn delete_order(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let order = ensure_order(ctx)?;
    let endpoint = format!("/store/order/{}", order.id);
    let response = ctx.send(&ApiRequest::delete(endpoint.as_str()))?;
    let expect = Expectations::new()
        .status(200)
        .expect_json([format!("\"message\":\"{}\"", order.id)]);
    let report = ctx.check(&response, &expect, "/store/order/{orderId}", "DELETE", true)?;
    ctx.order = None;

    let gone = ctx.send(&ApiRequest::get(endpoint))?;
    Ok(report.merge(ctx.verify(&gone, &Expectations::new().status(404))))
}

fn get_missing_order(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let response = ctx.send(&ApiRequest::get("/store/order/999999999"))?;
    let expect = Expectations::new()
        .status(404)
        .expect_json(["Order not found"]);
    Ok(ctx.verify(&response, &expect))
}
