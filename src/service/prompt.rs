/// Prompt text sent to the generator.
///
/// The maze prompt describes the map alphabet; the question prompt names
/// the tier's topic and lists recent questions that must not be repeated.
/// Questions are requested in Spanish.

use crate::sim::quiz::Difficulty;

pub fn maze_prompt(width: usize, height: usize) -> String {
    format!(
        "Generate a 2D grid map for a Pac-Man game.\n\
         Dimensions: {width} width x {height} height.\n\
         Characters allowed:\n\
         '#' for Wall\n\
         '.' for Dot\n\
         'o' for Power Pellet (place 4 in corners)\n\
         'S' for Pacman Spawn (place 1)\n\
         'G' for Ghost Spawn House (place a small 2x2 area in middle)\n\
         \n\
         Rules:\n\
         - The outer border must be walls '#'.\n\
         - Ensure the map is fully connected (no isolated areas).\n\
         - Make it symmetrical horizontally.\n\
         - Don't make it too open, include maze-like corridors.\n\
         \n\
         Respond with a JSON object {{\"layout\": [...]}} whose rows are strings \
         of exactly {width} characters.\n"
    )
}

fn topic(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Linear => {
            "Tema: Ecuaciones de primer grado.\n\
             Nivel: 2º ESO (España).\n\
             Requisitos adicionales:\n\
             - El resultado (valor de x) DEBE ser un número entero.\n"
        }
        Difficulty::Quadratic => {
            "Tema: Ecuaciones de segundo grado (completas o incompletas).\n\
             Nivel: 3º-4º ESO (España).\n\
             Requisitos adicionales:\n\
             - Las soluciones deben ser números enteros.\n\
             - Si hay dos soluciones, indicarlas en las opciones (ej: \"x = 2, x = -3\").\n"
        }
    }
}

pub fn question_prompt(history: &[String], difficulty: Difficulty) -> String {
    let mut prompt = String::from("Genera una pregunta de matemáticas tipo test (opción múltiple).\n");
    prompt.push_str(topic(difficulty));
    prompt.push_str(
        "\nRequisitos Generales:\n\
         - La ecuación debe ser clara y resoluble mentalmente o con poco cálculo.\n\
         - Proporciona 4 opciones de respuesta.\n\
         - Solo una es correcta.\n\
         - El idioma debe ser Español.\n",
    );

    if !history.is_empty() {
        // serde_json gives properly escaped quotes for the list
        let listed = serde_json::to_string(history).unwrap_or_default();
        prompt.push_str(
            "\nIMPORTANTE - NO REPETIR:\n\
             No generes ninguna de las siguientes ecuaciones o preguntas, inventa una totalmente nueva:\n",
        );
        prompt.push_str(&listed);
        prompt.push('\n');
    }

    prompt.push_str(
        "\nResponde con un objeto JSON {\"question\": ..., \"options\": [4 textos], \
         \"correctIndex\": 0-3}.\n",
    );
    prompt
}
