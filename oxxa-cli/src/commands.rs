//! Subcommand handlers. Text goes to stdout, one line per item; `--json`
//! prints a single JSON document instead.

use anyhow::{Context, Result};
use oxxa_api::{Domain, DomainDetails, DomainFilter, DomainTransfer, Oxxa, ResellerRef};
use serde::Serialize;

use crate::TransferArgs;

// ─── Handle listings ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct HandleRow<'a, D: Serialize> {
    handle: &'a str,
    #[serde(flatten)]
    details: &'a D,
}

/// Print `handle - alias` lines sorted by alias, or a JSON array.
fn print_handles<D: Serialize>(
    mut rows: Vec<HandleRow<'_, D>>,
    alias: fn(&D) -> &str,
    json: bool,
) -> Result<()> {
    rows.sort_by(|a, b| alias(a.details).cmp(alias(b.details)));
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            println!("{} - {}", row.handle, alias(row.details));
        }
    }
    Ok(())
}

pub fn list_identities(api: &Oxxa, json: bool) -> Result<()> {
    let identities = api.identities().all().context("listing identities")?;
    let rows = identities
        .iter()
        .map(|i| Ok(HandleRow { handle: i.handle(), details: i.details()? }))
        .collect::<oxxa_api::Result<Vec<_>>>()?;
    print_handles(rows, |d| d.alias.as_str(), json)
}

pub fn list_nsgroups(api: &Oxxa, json: bool) -> Result<()> {
    let nsgroups = api.nsgroups().all().context("listing nameserver groups")?;
    let rows = nsgroups
        .iter()
        .map(|n| Ok(HandleRow { handle: n.handle(), details: n.details()? }))
        .collect::<oxxa_api::Result<Vec<_>>>()?;
    print_handles(rows, |d| d.alias.as_str(), json)
}

pub fn list_resellers(api: &Oxxa, json: bool) -> Result<()> {
    let resellers = api.resellers().all().context("listing resellers")?;
    let rows = resellers
        .iter()
        .map(|r| Ok(HandleRow { handle: r.handle(), details: r.details()? }))
        .collect::<oxxa_api::Result<Vec<_>>>()?;
    print_handles(rows, |d| d.alias.as_str(), json)
}

// ─── Domains ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct DomainRow<'a> {
    domain: &'a str,
    #[serde(flatten)]
    details: &'a DomainDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    reseller: Option<String>,
}

fn yes_no(value: bool) -> &'static str {
    if value { "Y" } else { "N" }
}

pub fn list_domains(
    api: &Oxxa,
    tld: Option<String>,
    autorenew: Option<bool>,
    json: bool,
) -> Result<()> {
    let filter = DomainFilter {
        tld,
        autorenew,
        ..DomainFilter::default()
    };
    let domains = api
        .domains()
        .filter(&filter)
        .collect::<oxxa_api::Result<Vec<Domain>>>()
        .context("listing domains")?;

    if json {
        let rows = domains
            .iter()
            .map(|d| Ok(DomainRow { domain: d.name(), details: d.details()?, reseller: None }))
            .collect::<oxxa_api::Result<Vec<_>>>()?;
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for domain in &domains {
        let details = domain.details()?;
        println!(
            "{}  expires {}  autorenew={}  nsgroup={}",
            domain.name(),
            details.expire_date,
            yes_no(details.autorenew),
            details.nsgroup
        );
    }
    Ok(())
}

pub fn check_domain(api: &Oxxa, name: &str, json: bool) -> Result<()> {
    let free = api
        .domains()
        .get(name)
        .is_free()
        .with_context(|| format!("checking {name}"))?;
    if json {
        println!("{}", serde_json::json!({ "domain": name, "free": free }));
    } else {
        println!("{name}: {}", if free { "free" } else { "taken" });
    }
    Ok(())
}

pub fn domain_info(api: &Oxxa, name: &str, json: bool) -> Result<()> {
    let domain = api.domains().get(name);
    let details = domain.details().with_context(|| format!("fetching {name}"))?;
    let reseller = domain.reseller()?.handle().map(str::to_string);

    if json {
        let row = DomainRow { domain: domain.name(), details, reseller };
        println!("{}", serde_json::to_string_pretty(&row)?);
        return Ok(());
    }

    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    let flag = |b: Option<bool>| b.map(yes_no).unwrap_or("");
    println!("domain:          {}", domain.name());
    println!("nsgroup:         {}", details.nsgroup);
    println!("registrant:      {}", details.registrant);
    println!("admin:           {}", details.admin);
    println!("tech:            {}", details.tech);
    println!("billing:         {}", details.billing);
    println!("reseller:        {}", reseller.unwrap_or_default());
    println!("start_date:      {}", details.start_date);
    println!("expire_date:     {}", details.expire_date);
    println!("quarantaine_end: {}", date(details.quarantaine_end));
    println!("notice_date:     {}", date(details.notice_date));
    println!("autorenew:       {}", yes_no(details.autorenew));
    println!("lock:            {}", flag(details.lock));
    println!("usetrustee:      {}", flag(details.usetrustee));
    Ok(())
}

// ─── Transfer ────────────────────────────────────────────────────────────

pub fn transfer_domain(api: &Oxxa, args: &TransferArgs, json: bool) -> Result<()> {
    let identities = api.identities();
    let transfer = DomainTransfer {
        auth_code: args.key.clone(),
        registrant: identities.get(&args.registrant),
        admin: identities.get(&args.admin),
        tech: identities.get(&args.tech),
        billing: identities.get(&args.billing),
        reseller: ResellerRef::resolve(api, &args.reseller),
        nsgroup: api.nsgroups().get(&args.nsgroup),
    };
    let domain = api.domains().get(&args.domain);
    let order = api
        .domains()
        .transfer(&domain, &transfer)
        .with_context(|| format!("transferring {}", args.domain))?;

    let status = order.status();
    if json {
        println!(
            "{}",
            serde_json::json!({
                "domain": domain.name(),
                "order_id": order.order_id(),
                "status_code": status.code,
                "status_description": status.message,
            })
        );
    } else {
        println!(
            "{}: order {} ({}) {}",
            domain.name(),
            order.order_id(),
            status.code,
            status.message
        );
    }
    Ok(())
}
