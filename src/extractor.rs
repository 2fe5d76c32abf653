//! Client for the generative-text service that reads purchase invoices.
//!
//! The service output is free text meant for staff. It is stored on the
//! dossier verbatim and never parsed back into vehicle fields.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DossierError, Result};
use crate::models::VehicleRecord;
use crate::settings::{api_key, Settings, API_KEY_ENV};

/// Fixed instruction set sent with every request.
pub const INSTRUCTIONS: &str = "\
Je bent een assistent in de interne intake-app van een B2B-autohandel. Antwoord altijd in het Nederlands.

De gebruiker levert de tekst van een inkoopfactuur (of OCR-tekst) en soms extra context.
Verzin nooit gegevens: kenteken, chassisnummer en bedragen die niet in de bron staan laat je leeg.

Geef het antwoord in vaste blokken met duidelijke kopjes:
1. Samenvatting (1-3 regels).
2. Voertuiggegevens: leverancier_naam, leverancier_plaats, factuurnummer, factuurdatum, merk, model,
   type_of_uitvoering, brandstof (benzine, diesel, hybride, PHEV, EV), carrosserie, kenteken, meldcode,
   chassisnummer, bouwjaar, datum_eerste_toelating, kilometerstand, kleur, transmissie, vermogen_pk,
   vermogen_kw, btw_of_marge_auto (BTW of Marge), inkoopprijs_excl_btw, btw_bedrag, inkoopprijs_incl_btw,
   bpm_bedrag_op_factuur.
3. Locatie voertuig: standplaats_naam, standplaats_adres, standplaats_postcode, standplaats_plaats,
   standplaats_land, contactpersoon_naam, contactpersoon_telefoon, openingstijden.
4. E-mail aan transporteur (concept): onderwerp en korte zakelijke tekst. De ophaallocatie is nooit de
   eigen vestiging.
5. Inspectie: alleen invullen als er inspectie- of schade-informatie is aangeleverd. Per rubriek
   (exterieur, interieur, banden/velgen, ruiten/verlichting, techniek, elektronica) de schades met
   locatie, omschrijving, schade_type, schatting_uren en schatting_materiaalkosten. Zakelijk, zonder proza.
";

/// Anything that turns invoice text into a staff-readable extraction.
pub trait TextExtractor {
    fn extract(&self, instructions: &str, input: &str) -> Result<String>;
}

/// Text sent for a new intake: the pasted text plus the uploaded file name.
pub fn intake_request(text: &str, file_name: Option<&str>) -> String {
    let mut request = text.trim().to_string();
    if let Some(name) = file_name {
        if !request.is_empty() {
            request.push('\n');
        }
        request.push_str(&format!("[BESTANDSNAAM: {name}]"));
    }
    request
}

#[derive(Serialize)]
struct InspectionVehicle<'a> {
    merk: &'a str,
    model: &'a str,
    type_of_uitvoering: &'a str,
    kleur: &'a str,
    kenteken: Option<&'a str>,
    chassisnummer: Option<&'a str>,
    brandstof: &'a str,
    datum_eerste_toelating: &'a str,
}

/// Text sent to draft an inspection report for a stored vehicle.
pub fn inspection_request(inspection_text: &str, vehicle: &VehicleRecord) -> Result<String> {
    let summary = InspectionVehicle {
        merk: &vehicle.brand,
        model: &vehicle.model,
        type_of_uitvoering: &vehicle.trim,
        kleur: &vehicle.color,
        kenteken: vehicle.plate.as_deref(),
        chassisnummer: vehicle.chassis.as_deref(),
        brandstof: &vehicle.fuel,
        datum_eerste_toelating: &vehicle.first_registration,
    };
    let json = serde_json::to_string_pretty(&summary)?;
    Ok(format!(
        "INSPECTIE-INFORMATIE:\n{}\n\nAUTO:\n{json}",
        inspection_text.trim()
    ))
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Gemini `generateContent` over HTTPS.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_base: &str, model_name: &str, api_key: String) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            endpoint: generate_endpoint(api_base, model_name),
            api_key,
        })
    }

    /// Client configured from settings and the API key in the environment.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let key = api_key().ok_or_else(|| {
            DossierError::Extraction(format!("{API_KEY_ENV} is not set"))
        })?;
        Self::new(&settings.api_base, &settings.model_name, key)
    }
}

fn generate_endpoint(api_base: &str, model_name: &str) -> String {
    let base = api_base.trim().trim_end_matches('/');
    let model = model_name.trim().trim_start_matches("models/");
    format!("{base}/models/{model}:generateContent")
}

fn response_text(response: GenerateResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(DossierError::Extraction("service returned no text".to_string()));
    }
    Ok(text)
}

impl TextExtractor for GeminiClient {
    fn extract(&self, instructions: &str, input: &str) -> Result<String> {
        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: instructions }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: input }],
            }],
        };

        tracing::info!(endpoint = %self.endpoint, input_len = input.len(), "calling extraction service");
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let snippet: String = body.chars().take(300).collect();
            tracing::warn!(%status, "extraction service returned an error");
            return Err(DossierError::Extraction(format!("{status}: {snippet}")));
        }

        let parsed: GenerateResponse = response.json()?;
        let text = response_text(parsed)?;
        tracing::debug!(output_len = text.len(), "extraction received");
        Ok(text)
    }
}
