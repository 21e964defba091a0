//! The fixed sample dataset.

use crate::model::*;
use crate::Dataset;

pub fn sample() -> Dataset {
    Dataset {
        nutritionists: nutritionists(),
        patients: patients(),
        foods: foods(),
        recipes: recipes(),
        diet_plans: diet_plans(),
        meals: meals(),
        measurements: measurements(),
        messages: messages(),
        appointments: appointments(),
        relationships: relationships(),
    }
}

fn nutritionists() -> Vec<Nutritionist> {
    let n = |id, name, specialty, years_experience, email, phone| Nutritionist {
        id,
        name,
        specialty,
        years_experience,
        email,
        phone,
    };
    vec![
        n(1, "Ana Silva", "Nutrição Esportiva", 8, "ana@nutri.com", "21-99999-1111"),
        n(2, "Carlos Mendes", "Nutrição Clínica", 5, "carlos@nutri.com", "21-99999-2222"),
        n(3, "Mariana Costa", "Nutrição Funcional", 12, "mariana@nutri.com", "21-99999-3333"),
    ]
}

fn patients() -> Vec<Patient> {
    vec![
        Patient {
            id: 1,
            name: "João Pereira",
            age: 35,
            gender: "M",
            height_cm: 178,
            initial_weight_kg: 92.0,
            email: "joao@email.com",
            phone: "21-88888-1111",
            restrictions: &["Glúten"],
            allergies: &["Amendoim"],
            goal: "Emagrecimento",
        },
        Patient {
            id: 2,
            name: "Maria Santos",
            age: 42,
            gender: "F",
            height_cm: 165,
            initial_weight_kg: 78.0,
            email: "maria@email.com",
            phone: "21-88888-2222",
            restrictions: &["Lactose"],
            allergies: &[],
            goal: "Controle de colesterol",
        },
        Patient {
            id: 3,
            name: "Pedro Alves",
            age: 28,
            gender: "M",
            height_cm: 182,
            initial_weight_kg: 75.0,
            email: "pedro@email.com",
            phone: "21-88888-3333",
            restrictions: &[],
            allergies: &[],
            goal: "Ganho de massa muscular",
        },
        Patient {
            id: 4,
            name: "Lúcia Ferreira",
            age: 55,
            gender: "F",
            height_cm: 160,
            initial_weight_kg: 85.0,
            email: "lucia@email.com",
            phone: "21-88888-4444",
            restrictions: &["Sódio"],
            allergies: &["Frutos do mar"],
            goal: "Controle de diabetes",
        },
        Patient {
            id: 5,
            name: "Ricardo Gomes",
            age: 30,
            gender: "M",
            height_cm: 175,
            initial_weight_kg: 88.0,
            email: "ricardo@email.com",
            phone: "21-88888-5555",
            restrictions: &[],
            allergies: &["Nozes"],
            goal: "Emagrecimento",
        },
    ]
}

fn foods() -> Vec<Food> {
    #[allow(clippy::too_many_arguments)]
    fn f(
        id: u32,
        name: &'static str,
        portion: &'static str,
        calories: i64,
        protein_g: f64,
        carbs_g: f64,
        fat_g: f64,
        fiber_g: f64,
        group: &'static str,
    ) -> Food {
        Food {
            id,
            name,
            portion,
            calories,
            protein_g,
            carbs_g,
            fat_g,
            fiber_g,
            group,
        }
    }
    vec![
        f(1, "Maçã", "1 unidade (150g)", 95, 0.5, 25.0, 0.3, 4.4, "Frutas"),
        f(2, "Peito de Frango", "100g", 165, 31.0, 0.0, 3.6, 0.0, "Carnes"),
        f(3, "Arroz Integral", "100g cozido", 112, 2.6, 23.5, 0.9, 1.8, "Cereais"),
        f(4, "Brócolis", "100g", 34, 2.8, 6.6, 0.4, 2.6, "Vegetais"),
        f(5, "Salmão", "100g", 206, 22.0, 0.0, 13.0, 0.0, "Peixes"),
        f(6, "Lentilha", "100g cozida", 116, 9.0, 20.0, 0.4, 7.9, "Leguminosas"),
        f(7, "Iogurte Natural", "100g", 59, 3.5, 4.7, 3.3, 0.0, "Laticínios"),
        f(8, "Aveia", "30g", 117, 4.0, 21.0, 2.0, 3.0, "Cereais"),
        f(9, "Azeite", "1 colher (10ml)", 90, 0.0, 0.0, 10.0, 0.0, "Óleos"),
        f(10, "Banana", "1 unidade (120g)", 105, 1.3, 27.0, 0.4, 3.1, "Frutas"),
    ]
}

fn recipes() -> Vec<Recipe> {
    let r = |id, name, instructions, prep_minutes, difficulty, calories| Recipe {
        id,
        name,
        instructions,
        prep_minutes,
        difficulty,
        calories,
    };
    vec![
        r(
            1,
            "Salada de Frango com Abacate",
            "Corte o peito de frango em cubos e grelhe. Misture com abacate, tomate e folhas verdes. Tempere com azeite, limão e sal.",
            20,
            "Fácil",
            320,
        ),
        r(
            2,
            "Bowl de Açaí com Frutas",
            "Misture açaí congelado batido com banana. Adicione granola, frutas frescas e mel.",
            10,
            "Fácil",
            450,
        ),
        r(
            3,
            "Salmão Grelhado com Legumes",
            "Grelhe o filé de salmão. Refogue brócolis, cenoura e abobrinha. Sirva com arroz integral.",
            30,
            "Médio",
            480,
        ),
        r(
            4,
            "Smoothie Proteico",
            "Bata no liquidificador iogurte, banana, aveia, pasta de amendoim e mel.",
            5,
            "Fácil",
            350,
        ),
        r(
            5,
            "Omelete de Legumes",
            "Bata 2 ovos, adicione espinafre, tomate e queijo. Cozinhe em frigideira antiaderente.",
            15,
            "Fácil",
            280,
        ),
    ]
}

fn diet_plans() -> Vec<DietPlan> {
    #[allow(clippy::too_many_arguments)]
    fn plan(
        id: u32,
        name: &'static str,
        description: &'static str,
        goal: &'static str,
        duration_days: i64,
        daily_calories: i64,
        (protein, carbs, fat): (&'static str, &'static str, &'static str),
    ) -> DietPlan {
        DietPlan {
            id,
            name,
            description,
            goal,
            duration_days,
            daily_calories,
            macronutrients: Macronutrients {
                protein,
                carbs,
                fat,
            },
        }
    }
    vec![
        plan(
            1,
            "Emagrecimento Saudável",
            "Plano focado em déficit calórico moderado com alimentos nutritivos",
            "Perda de peso",
            90,
            1800,
            ("30%", "40%", "30%"),
        ),
        plan(
            2,
            "Ganho de Massa",
            "Plano focado em superávit calórico com alta proteína",
            "Hipertrofia",
            120,
            2800,
            ("35%", "45%", "20%"),
        ),
        plan(
            3,
            "Controle Glicêmico",
            "Plano para controle de diabetes com baixo índice glicêmico",
            "Controle de glicemia",
            180,
            1600,
            ("25%", "35%", "40%"),
        ),
        plan(
            4,
            "Controle de Colesterol",
            "Plano para redução de colesterol LDL e aumento de HDL",
            "Saúde cardiovascular",
            90,
            2000,
            ("25%", "50%", "25%"),
        ),
        plan(
            5,
            "Dieta Anti-inflamatória",
            "Plano rico em antioxidantes e ômega-3",
            "Redução de inflamação",
            60,
            2200,
            ("20%", "55%", "25%"),
        ),
    ]
}

fn meals() -> Vec<Meal> {
    let m = |id, meal_type, date, time, calories, adherence, photo_logged| Meal {
        id,
        meal_type,
        date,
        time,
        calories,
        adherence,
        photo_logged,
    };
    vec![
        m(1, "Café da manhã", "2023-10-18", "08:00", 320, "Completa", true),
        m(2, "Almoço", "2023-10-18", "12:30", 580, "Parcial", true),
        m(3, "Lanche", "2023-10-18", "16:00", 180, "Completa", false),
        m(4, "Jantar", "2023-10-18", "20:00", 450, "Completa", true),
        m(5, "Café da manhã", "2023-10-19", "07:45", 340, "Completa", true),
        m(6, "Almoço", "2023-10-19", "13:00", 620, "Completa", true),
        m(7, "Lanche", "2023-10-19", "15:30", 200, "Parcial", false),
        m(8, "Jantar", "2023-10-19", "19:30", 380, "Não realizada", false),
    ]
}

fn measurements() -> Vec<BodyMeasurement> {
    #[allow(clippy::too_many_arguments)]
    fn m(
        id: u32,
        date: &'static str,
        weight_kg: f64,
        bmi: f64,
        body_fat_pct: f64,
        waist_cm: f64,
        hips_cm: f64,
        blood_pressure: &'static str,
    ) -> BodyMeasurement {
        BodyMeasurement {
            id,
            date,
            weight_kg,
            bmi,
            body_fat_pct,
            waist_cm,
            hips_cm,
            blood_pressure,
        }
    }
    vec![
        m(1, "2023-09-15", 92.0, 29.1, 28.0, 102.0, 106.0, "130/85"),
        m(2, "2023-10-01", 89.5, 28.2, 26.8, 99.0, 105.0, "128/83"),
        m(3, "2023-10-15", 87.8, 27.7, 25.5, 97.0, 104.0, "125/82"),
        m(4, "2023-09-10", 78.0, 28.7, 32.0, 91.0, 110.0, "135/88"),
        m(5, "2023-09-25", 77.2, 28.4, 31.5, 90.0, 109.0, "132/86"),
        m(6, "2023-10-10", 76.5, 28.1, 30.8, 88.0, 108.0, "130/85"),
    ]
}

fn messages() -> Vec<Message> {
    let m = |id, content, date, time, read| Message {
        id,
        content,
        date,
        time,
        read,
    };
    vec![
        m(1, "Como está se sentindo com a nova dieta?", "2023-10-15", "14:30", true),
        m(2, "Estou me adaptando bem, mas sinto fome à tarde", "2023-10-15", "15:45", true),
        m(3, "Vamos ajustar seu lanche da tarde para resolver isso", "2023-10-15", "16:20", true),
        m(4, "Lembrete: sua consulta é amanhã às 14h", "2023-10-16", "09:00", true),
        m(5, "Confirmado, estarei lá", "2023-10-16", "09:15", true),
        m(6, "Como está se sentindo após a última consulta?", "2023-10-20", "11:00", false),
    ]
}

fn appointments() -> Vec<Appointment> {
    let a = |id, date, time, status, notes| Appointment {
        id,
        date,
        time,
        status,
        notes,
    };
    vec![
        a(1, "2023-09-15", "14:00", "Realizada", "Avaliação inicial e definição de plano alimentar"),
        a(2, "2023-10-01", "15:30", "Realizada", "Ajustes no plano devido à fome relatada"),
        a(3, "2023-10-17", "14:00", "Realizada", "Progresso acima do esperado, reforço positivo"),
        a(4, "2023-11-01", "16:00", "Agendada", ""),
        a(5, "2023-09-10", "09:30", "Realizada", "Avaliação inicial, paciente com colesterol alto"),
        a(6, "2023-09-25", "10:00", "Realizada", "Melhora nos exames laboratoriais"),
        a(7, "2023-10-10", "11:00", "Realizada", "Exames demonstrando normalização do colesterol"),
        a(8, "2023-10-25", "09:30", "Cancelada", "Paciente não pôde comparecer"),
    ]
}

fn relationships() -> Vec<Relationship> {
    use Relationship as R;

    let mut rels = Vec::new();

    for (nutritionist, patient) in [(1, 1), (1, 3), (2, 2), (3, 4), (3, 5)] {
        rels.push(R::Treats {
            nutritionist,
            patient,
        });
    }
    for (nutritionist, plan) in [(1, 1), (1, 2), (2, 4), (3, 3), (3, 5)] {
        rels.push(R::Creates { nutritionist, plan });
    }
    for (patient, plan) in [(1, 1), (2, 4), (3, 2), (4, 3), (5, 5)] {
        rels.push(R::Follows { patient, plan });
    }
    for (plan, food) in [
        (1, 2),
        (1, 3),
        (1, 4),
        (2, 2),
        (2, 5),
        (2, 8),
        (3, 4),
        (3, 6),
        (4, 5),
        (4, 6),
        (5, 5),
        (5, 9),
    ] {
        rels.push(R::PlanIncludes { plan, food });
    }
    for (plan, recipe) in [(1, 1), (1, 5), (2, 3), (2, 4), (3, 5), (4, 3), (5, 1), (5, 3)] {
        rels.push(R::Recommends { plan, recipe });
    }
    for (recipe, food, quantity) in [
        (1, 2, "100g"),
        (1, 4, "50g"),
        (1, 9, "5ml"),
        (2, 10, "1 unidade"),
        (3, 5, "150g"),
        (3, 4, "100g"),
        (3, 3, "100g"),
        (4, 7, "200g"),
        (4, 10, "1 unidade"),
        (4, 8, "30g"),
        (5, 4, "50g"),
    ] {
        rels.push(R::Contains {
            recipe,
            food,
            quantity,
        });
    }
    for (patient, meal) in [(1, 1), (1, 2), (1, 3), (1, 4), (2, 5), (2, 6), (2, 7), (2, 8)] {
        rels.push(R::Consumes { patient, meal });
    }
    for (meal, item) in [
        (1, MealItem::Recipe(4)),
        (2, MealItem::Recipe(1)),
        (3, MealItem::Food(1)),
        (3, MealItem::Food(7)),
        (4, MealItem::Recipe(3)),
        (5, MealItem::Recipe(2)),
        (6, MealItem::Recipe(3)),
        (7, MealItem::Food(1)),
        (8, MealItem::Recipe(5)),
    ] {
        rels.push(R::MealIncludes { meal, item });
    }
    for (patient, measurement) in [(1, 1), (1, 2), (1, 3), (2, 4), (2, 5), (2, 6)] {
        rels.push(R::HasMeasurement {
            patient,
            measurement,
        });
    }
    for (message, from, to) in [
        (1, Party::Nutritionist(1), Party::Patient(1)),
        (2, Party::Patient(1), Party::Nutritionist(1)),
        (3, Party::Nutritionist(1), Party::Patient(1)),
        (4, Party::Nutritionist(1), Party::Patient(1)),
        (5, Party::Patient(1), Party::Nutritionist(1)),
        (6, Party::Nutritionist(2), Party::Patient(2)),
    ] {
        rels.push(R::Exchange { message, from, to });
    }
    for (appointment, patient, nutritionist) in [
        (1, 1, 1),
        (2, 1, 1),
        (3, 1, 1),
        (4, 1, 1),
        (5, 2, 2),
        (6, 2, 2),
        (7, 2, 2),
        (8, 2, 2),
    ] {
        rels.push(R::Schedules {
            appointment,
            patient,
            nutritionist,
        });
    }

    rels
}
