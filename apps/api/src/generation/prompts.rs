// All LLM prompt constants for the generation module. Everything the model
// sees is Czech; the JSON keys it must emit are English per the wire contract.

/// Built-in base system prompt, used when the admin never configured one or
/// the settings lookup fails.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Jsi zkušený učitel tělesné výchovy a metodik \
    se specializací na plánování hodin TV pro základní školy (1.–9. ročník). \
    Navrhuješ konkrétní, bezpečné a věku přiměřené cviky a dbáš na správnou \
    stavbu hodiny: přípravná část, hlavní část, závěrečná část.";

/// Structural contract appended to every system prompt: the exact JSON shape
/// plus the phase-isolation rule set.
pub const STRUCTURE_CONTRACT: &str = r#"VÝSTUPNÍ FORMÁT — povinný:
Odpověz POUZE platným JSON objektem přesně tohoto tvaru, bez jakéhokoli textu okolo
a bez markdown bloků:
{
  "preparation": [{"name": "...", "description": "...", "time": 5}],
  "main": [{"name": "...", "description": "...", "time": 15}],
  "finish": [{"name": "...", "description": "...", "time": 5}]
}

PRAVIDLA IZOLACE FÁZÍ — závazná:
1. Cvik navržený pro přípravnou část se NESMÍ objevit v hlavní ani závěrečné části.
2. Cvik navržený pro hlavní část se NESMÍ objevit v přípravné ani závěrečné části.
3. Cvik navržený pro závěrečnou část se NESMÍ objevit v přípravné ani hlavní části.
4. Podklady označené pro určitou fázi používej výhradně pro tuto fázi."#;

/// Full per-exercise description rubric for single-lesson generation.
pub const RUBRIC_FULL: &str = "POŽADAVKY NA POPIS KAŽDÉHO CVIKU:\n\
    - výchozí postavení (postoj, rozestavení, náčiní),\n\
    - provedení krok za krokem,\n\
    - technické body a bezpečnostní upozornění,\n\
    - konkrétní počet opakování nebo dobu trvání,\n\
    - volitelně snazší a těžší variantu,\n\
    - VŽDY zakonči popis krátkou motivační větou, kterou říká učitel/trenér žákům.";

/// The same rubric compressed for multi-week generation, where the model is
/// called once per lesson slot and prompt size must stay bounded.
pub const RUBRIC_COMPRESSED: &str = "POPIS CVIKU: výchozí postavení, provedení, \
    bezpečnost, konkrétní dávkování; na závěr vždy jedna motivační věta učitele.";

/// Instruction block for partial-phase regeneration.
/// Replace `{phases}` with the comma-separated Czech phase labels.
pub const PARTIAL_PHASE_TEMPLATE: &str = "ČÁSTEČNÉ GENEROVÁNÍ: Vygeneruj cviky POUZE pro tyto \
    části hodiny: {phases}. Ostatní části ponech beze změny — v JSON pro ně vrať prázdné pole.";

/// Closing line of every user prompt.
pub const CLOSING_REMINDER: &str = "DŮLEŽITÉ: Popisy cviků nikdy nezkracuj kvůli délce odpovědi. \
    Každý popis musí být úplný.";

/// Exhaustive cross-phase contamination checklist appended to the knowledge
/// context in single-lesson mode.
pub const KNOWLEDGE_CHECKLIST_FULL: &str = "KONTROLA PŘED ODESLÁNÍM ODPOVĚDI:\n\
    1. Projdi každý cvik v \"preparation\" a ověř, že jeho podklad nebyl označen pro jinou fázi.\n\
    2. Projdi každý cvik v \"main\" a ověř, že jeho podklad nebyl označen pro jinou fázi.\n\
    3. Projdi každý cvik v \"finish\" a ověř, že jeho podklad nebyl označen pro jinou fázi.\n\
    4. Pokud najdeš porušení, cvik přesuň nebo nahraď jiným ze správné fáze.";

/// Condensed phase-isolation note used for multi-week requests.
pub const KNOWLEDGE_NOTE_CONDENSED: &str =
    "Podklady používej výhradně ve fázi, pro kterou jsou označeny.";

/// Four-step anti-repetition self-check for single-lesson mode.
pub const REPETITION_SELF_CHECK: &str = "KONTROLA OPAKOVÁNÍ:\n\
    1. Vypiš si názvy všech cviků, které navrhuješ.\n\
    2. Porovnej každý název se seznamem zakázaných cviků výše (bez ohledu na velikost písmen).\n\
    3. Každý shodný nebo velmi podobný cvik nahraď jiným.\n\
    4. Teprve potom odpověz.";

/// Terse anti-repetition directive for multi-week mode.
pub const REPETITION_DIRECTIVE_CONDENSED: &str =
    "Žádný z uvedených cviků znovu nepoužívej.";
