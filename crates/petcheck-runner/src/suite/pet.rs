use petcheck_core::{ApiRequest, Expectations, Report};
use rand::Rng;

use super::{Ctx, Scenario, ScenarioError, setup_request};
use crate::fixtures::{self, Pet, PetStatus};

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "add pet",
        run: add_pet,
    },
    Scenario {
        name: "get pet by id",
        run: get_pet,
    },
    Scenario {
        name: "update pet",
        run: update_pet,
    },
    Scenario {
        name: "find pets by status",
        run: find_by_status,
    },
    Scenario {
        name: "get missing pet",
        run: get_missing_pet,
    },
    Scenario {
        name: "add invalid pet",
        run: add_invalid_pet,
    },
    Scenario {
        name: "delete pet",
        run: delete_pet,
    },
];

/// Pet created earlier in the suite, or a fresh one.
fn ensure_pet(ctx: &mut Ctx<'_>) -> Result<Pet, ScenarioError> {
    if let Some(pet) = &ctx.pet {
        return Ok(pet.clone());
    }
    let pet = fixtures::pet(&mut ctx.rng);
    setup_request(ctx, &ApiRequest::post("/pet", fixtures::to_json(&pet)?))?;
    ctx.pet = Some(pet.clone());
    Ok(pet)
}

fn add_pet(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let pet = fixtures::pet(&mut ctx.rng);
    let response = ctx.send(&ApiRequest::post("/pet", fixtures::to_json(&pet)?))?;
    let expect = Expectations::new()
        .status(200)
        .expect_json([format!("\"id\":{}", pet.id), format!("\"name\":\"{}\"", pet.name)])
        .expect_headers(["application/json"]);
    let report = ctx.check(&response, &expect, "/pet", "POST", true)?;
    if response.status_code == 200 {
        ctx.pet = Some(pet);
    }
    Ok(report)
}

fn get_pet(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let pet = ensure_pet(ctx)?;
    let response = ctx.send(&ApiRequest::get(format!("/pet/{}", pet.id)))?;
    let expect = Expectations::new()
        .status(200)
        .expect_json([
            format!("\"id\":{}", pet.id),
            format!("\"name\":\"{}\"", pet.name),
            format!("\"status\":\"{}\"", pet.status.as_str()),
        ]);
    ctx.check(&response, &expect, "/pet/{petId}", "GET", true)
}

fn update_pet(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let mut pet = ensure_pet(ctx)?;
    pet.name = format!("{}-renamed", pet.name);
    pet.status = PetStatus::Sold;
    let response = ctx.send(&ApiRequest::put("/pet", fixtures::to_json(&pet)?))?;
    let expect = Expectations::new()
        .status(200)
        .expect_json([
            format!("\"name\":\"{}\"", pet.name),
            "\"status\":\"sold\"".to_string(),
        ]);
    let report = ctx.check(&response, &expect, "/pet", "PUT", true)?;
    if response.status_code == 200 {
        ctx.pet = Some(pet);
    }
    Ok(report)
}

fn find_by_status(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let pet = ensure_pet(ctx)?;
    let status = pet.status.as_str();
    let response =
        ctx.send(&ApiRequest::get("/pet/findByStatus").with_query("status", status))?;
    let others: Vec<String> = PetStatus::ALL
        .iter()
        .filter(|s| **s != pet.status)
        .map(|s| format!("\"status\":\"{}\"", s.as_str()))
        .collect();
    let expect = Expectations::new()
        .status(200)
        .expect_json([format!("\"status\":\"{status}\"")])
        .reject_json(others);
    ctx.check(&response, &expect, "/pet/findByStatus", "GET", false)
}

fn get_missing_pet(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let id: i64 = ctx.rng.gen_range(9_000_000_000_000..9_100_000_000_000);
    let response = ctx.send(&ApiRequest::get(format!("/pet/{id}")))?;
    let expect = Expectations::new()
        .status(404)
        .expect_json(["Pet not found"])
        .reject_json([format!("\"id\":{id}")]);
    Ok(ctx.verify(&response, &expect))
}

fn add_invalid_pet(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let body = fixtures::invalid_pet(&mut ctx.rng);
    let response = ctx.send(&ApiRequest::post("/pet", body))?;
    let expect = Expectations::new()
        .status(500)
        .expect_json(["something bad happened"]);
    Ok(ctx.verify(&response, &expect))
}

fn delete_pet(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let pet = ensure_pet(ctx)?;
    let endpoint = format!("/pet/{}", pet.id);
    let response = ctx.send(&ApiRequest::delete(endpoint.as_str()))?;
    let expect = Expectations::new()
        .status(200)
        .expect_json([format!("\"message\":\"{}\"", pet.id)]);
    let report = ctx.check(&response, &expect, "/pet/{petId}", "DELETE", true)?;
    ctx.pet = None;

    let gone = ctx.send(&ApiRequest::get(endpoint))?;
    Ok(report.merge(ctx.verify(&gone, &Expectations::new().status(404))))
}
