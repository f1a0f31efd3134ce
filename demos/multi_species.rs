use bioreactor::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // First, we describe the contactor. The hydraulic and aeration conditions are shared
    // by all populations, while every species carries its own growth kinetics.
    //
    // The per-species vectors must have the same length. This length defines the number
    // of species, so a mismatch is rejected here instead of failing mid-run.
    let params = MultiSpeciesRbcParameters::from_vectors(
        RbcConditions::default(),
        vec![0.5, 0.3, 0.2], // mu_max
        vec![10.0, 15.0, 5.0], // K_s
        vec![0.05, 0.03, 0.02], // k_d
        vec![0.5, 0.4, 0.3],   // Y
        vec![1.5, 1.2, 1.0],   // Y_o
    )?;

    // The initial state is packed as [C, X_1, X_2, X_3, O]. The state struct
    // checks that one initial biomass is given per species.
    let y0 = MultiSpeciesRbcState {
        cyanide: 0.0,
        biomass: vec![10.0, 5.0, 2.0],
        oxygen: 8.0,
    }
    .pack(&params)?;

    // Next, we configure the time domain: one day sampled at 100 points,
    // integrated with the 8th order Dormand-Prince scheme
    let setup = SimulationSetupBuilder::default()
        .t0(0.0)
        .t1(24.0)
        .n_points(100)
        .method(Method::Dop853)
        .build()?;

    // Finally, we run the simulation!
    //
    // The output format is chosen by type inference. Trajectory gives the raw
    // state matrix, ExtractedSeries the named series grouped into panels.
    let series: ExtractedSeries = simulate(&params, &y0, &setup)?;
    println!("{series}");

    // The series bundle can be turned into a plotly figure directly
    let plot = series
        .plot()
        .config(PlotConfig {
            title: "Three-Species RBC".to_string(),
            ..Default::default()
        })
        .call();
    plot.write_html("multi_species.html");

    Ok(())
}
