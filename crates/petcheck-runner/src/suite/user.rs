use petcheck_core::{ApiRequest, Expectations, Report};

use super::{Ctx, Scenario, ScenarioError, setup_request};
use crate::fixtures::{self, User};

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "create user",
        run: create_user,
    },
    Scenario {
        name: "get user by username",
        run: get_user,
    },
    Scenario {
        name: "update user",
        run: update_user,
    },
    Scenario {
        name: "login user",
        run: login_user,
    },
    Scenario {
        name: "logout user",
        run: logout_user,
    },
    Scenario {
        name: "create invalid user",
        run: create_invalid_user,
    },
    Scenario {
        name: "delete user",
        run: delete_user,
    },
    Scenario {
        name: "get missing user",
        run: get_missing_user,
    },
];

fn ensure_user(ctx: &mut Ctx<'_>) -> Result<User, ScenarioError> {
    if let Some(user) = &ctx.user {
        return Ok(user.clone());
    }
    let user = fixtures::user(&mut ctx.rng);
    setup_request(ctx, &ApiRequest::post("/user", fixtures::to_json(&user)?))?;
    ctx.user = Some(user.clone());
    Ok(user)
}

fn create_user(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let user = fixtures::user(&mut ctx.rng);
    let response = ctx.send(&ApiRequest::post("/user", fixtures::to_json(&user)?))?;
    let expect = Expectations::new()
        .status(200)
        .expect_json([format!("\"message\":\"{}\"", user.id)]);
    let report = ctx.check(&response, &expect, "/user", "POST", true)?;
    if response.status_code == 200 {
        ctx.user = Some(user);
    }
    Ok(report)
}

fn get_user(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let user = ensure_user(ctx)?;
    let response = ctx.send(&ApiRequest::get(format!("/user/{}", user.username)))?;
    let expect = Expectations::new()
        .status(200)
        .expect_json([
            format!("\"username\":\"{}\"", user.username),
            format!("\"email\":\"{}\"", user.email),
        ]);
    ctx.check(&response, &expect, "/user/{username}", "GET", true)
}

fn update_user(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let mut user = ensure_user(ctx)?;
    user.first_name = format!("{}-updated", user.first_name);
    let response = ctx.send(&ApiRequest::put(
        format!("/user/{}", user.username),
        fixtures::to_json(&user)?,
    ))?;
    let expect = Expectations::new()
        .status(200)
        .expect_json([format!("\"message\":\"{}\"", user.id)]);
    let report = ctx.check(&response, &expect, "/user/{username}", "PUT", true)?;
    if response.status_code != 200 {
        return Ok(report);
    }

    let fetched = ctx.send(&ApiRequest::get(format!("/user/{}", user.username)))?;
    let expect = Expectations::new()
        .status(200)
        .expect_json([format!("\"firstName\":\"{}\"", user.first_name)]);
    let report = report.merge(ctx.verify(&fetched, &expect));
    ctx.user = Some(user);
    Ok(report)
}

fn login_user(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let user = ensure_user(ctx)?;
    let request = ApiRequest::get("/user/login")
        .with_query("username", user.username.as_str())
        .with_query("password", user.password.as_str());
    let response = ctx.send(&request)?;
    let expect = Expectations::new()
        .status(200)
        .expect_json(["logged in user session"])
        .expect_headers(["x-rate-limit", "x-expires-after"])
        .reject_body([user.password.as_str()]);
    ctx.check(&response, &expect, "/user/login", "GET", false)
}

fn logout_user(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let response = ctx.send(&ApiRequest::get("/user/logout"))?;
    let expect = Expectations::new()
        .status(200)
        .expect_json(["\"message\":\"ok\""]);
    ctx.check(&response, &expect, "/user/logout", "GET", true)
}

fn create_invalid_user(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let body = fixtures::invalid_user(&mut ctx.rng);
    let response = ctx.send(&ApiRequest::post("/user", body))?;
    let expect = Expectations::new()
        .status(500)
        .expect_json(["something bad happened"]);
    Ok(ctx.verify(&response, &expect))
}

fn delete_user(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let user = ensure_user(ctx)?;
    let endpoint = format!("/user/{}", user.username);
    let response = ctx.send(&ApiRequest::delete(endpoint.as_str()))?;
    let expect = Expectations::new()
        .status(200)
        .expect_json([format!("\"message\":\"{}\"", user.username)]);
    let report = ctx.check(&response, &expect, "/user/{username}", "DELETE", true)?;
    ctx.user = None;

    let gone = ctx.send(&ApiRequest::get(endpoint))?;
    Ok(report.merge(ctx.verify(&gone, &Expectations::new().status(404))))
}

fn get_missing_user(ctx: &mut Ctx<'_>) -> Result<Report, ScenarioError> {
    let username = format!("{}-missing", fixtures::user(&mut ctx.rng).username);
    let response = ctx.send(&ApiRequest::get(format!("/user/{username}")))?;
    let expect = Expectations::new()
        .status(404)
        .expect_json(["User not found"]);
    Ok(ctx.verify(&response, &expect))
}
